//! Dashboard command - one-shot render or watch loop over the cached table

use crate::dashboard::{build_dashboard, DashboardOptions, DashboardState, Freshness, HistoryCache};
use crate::error::Result;
use chrono::Utc;
use chrono_tz::Tz;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Keyboard commands accepted in watch mode (one per line)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    Refresh,
    Quit,
}

impl WatchCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "refresh" => Some(Self::Refresh),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Build the dashboard from the cached table; an unreadable history file
/// becomes an error state instead of failing the render
pub fn cmd_dashboard(
    cache: &mut HistoryCache,
    options: &DashboardOptions,
    tz: Tz,
) -> Result<DashboardState> {
    let table = match cache.get() {
        Ok(table) => table,
        Err(e) => {
            warn!("Could not read {}: {}", cache.path().display(), e);
            return Ok(DashboardState::Error {
                message: e.to_string(),
            });
        }
    };
    let freshness = Freshness::observe(&table, cache.path(), tz);
    build_dashboard(&table, options, freshness, Utc::now())
}

/// Re-render every `refresh` until `q` is read from `input`; `r` drops the
/// cache and re-renders at once. Returns the number of renders.
pub async fn watch_dashboard<R, F>(
    cache: &mut HistoryCache,
    options: &DashboardOptions,
    tz: Tz,
    refresh: Duration,
    input: R,
    mut show: F,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&DashboardState) -> Result<()>,
{
    let mut ticker = tokio::time::interval(refresh);
    let mut lines = input.lines();
    let mut input_open = true;
    let mut renders = 0;

    info!("Watching dashboard every {}s ('r' refresh, 'q' quit)", refresh.as_secs());

    loop {
        tokio::select! {
            biased;

            _ = ticker.tick() => {
                show(&cmd_dashboard(cache, options, tz)?)?;
                renders += 1;
            }
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(line) => match WatchCommand::parse(&line) {
                        Some(WatchCommand::Refresh) => {
                            cache.invalidate();
                            show(&cmd_dashboard(cache, options, tz)?)?;
                            renders += 1;
                            ticker.reset();
                        }
                        Some(WatchCommand::Quit) => break,
                        None => debug!("Ignoring watch input {:?}", line),
                    },
                    // stdin closed; keep refreshing on the timer
                    None => input_open = false,
                }
            }
        }
    }

    Ok(renders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::snapshot;
    use crate::history::HistoryTable;
    use tempfile::TempDir;

    fn cache_with(tmp: &TempDir, views: u64) -> HistoryCache {
        let path = tmp.path().join("history.csv");
        HistoryTable::new(vec![snapshot("AAAAAAAAAAA", "2025-05-01", views)])
            .save(&path)
            .unwrap();
        HistoryCache::new(path, Duration::from_secs(3600))
    }

    fn views_of(state: &DashboardState) -> Option<u64> {
        match state {
            DashboardState::Ready(view) => view.cards.first().map(|c| c.views),
            _ => None,
        }
    }

    #[test]
    fn test_parse_watch_command() {
        assert_eq!(WatchCommand::parse(" R \n"), Some(WatchCommand::Refresh));
        assert_eq!(WatchCommand::parse("q"), Some(WatchCommand::Quit));
        assert_eq!(WatchCommand::parse("hello"), None);
    }

    #[test]
    fn test_one_shot_dashboard() {
        let tmp = TempDir::new().unwrap();
        let mut cache = cache_with(&tmp, 42);
        let state = cmd_dashboard(&mut cache, &DashboardOptions::default(), chrono_tz::UTC).unwrap();
        assert_eq!(views_of(&state), Some(42));
    }

    #[test]
    fn test_missing_history_is_empty_state() {
        let tmp = TempDir::new().unwrap();
        let mut cache = HistoryCache::new(tmp.path().join("absent.csv"), Duration::from_secs(60));
        let state = cmd_dashboard(&mut cache, &DashboardOptions::default(), chrono_tz::UTC).unwrap();
        assert!(matches!(state, DashboardState::Empty { .. }));
    }

    #[test]
    fn test_garbled_header_still_renders() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.csv");
        std::fs::write(&path, b"d\xffte,video_id\n2025-05-01,AAAAAAAAAAA\n").unwrap();

        let mut cache = HistoryCache::new(path, Duration::from_secs(60));
        let state = cmd_dashboard(&mut cache, &DashboardOptions::default(), chrono_tz::UTC).unwrap();
        // the date column is not recognized, so nothing can be charted
        assert!(matches!(state, DashboardState::Empty { skipped_rows: 0 }));
    }

    #[test]
    fn test_unreadable_history_is_error_state() {
        let tmp = TempDir::new().unwrap();
        // a directory where the file should be cannot be read as CSV
        let path = tmp.path().join("history.csv");
        std::fs::create_dir(&path).unwrap();

        let mut cache = HistoryCache::new(path, Duration::from_secs(60));
        let state = cmd_dashboard(&mut cache, &DashboardOptions::default(), chrono_tz::UTC).unwrap();
        assert!(matches!(state, DashboardState::Error { .. }));
    }

    #[tokio::test]
    async fn test_watch_survives_unreadable_history() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.csv");
        std::fs::create_dir(&path).unwrap();
        let mut cache = HistoryCache::new(path, Duration::from_secs(3600));

        let mut errors = 0;
        let input: &[u8] = b"r\nq\n";
        let renders = watch_dashboard(
            &mut cache,
            &DashboardOptions::default(),
            chrono_tz::UTC,
            Duration::from_secs(3600),
            input,
            |state| {
                if matches!(state, DashboardState::Error { .. }) {
                    errors += 1;
                }
                Ok(())
            },
        )
        .await
        .unwrap();

        assert_eq!(renders, 2);
        assert_eq!(errors, 2);
    }

    #[tokio::test]
    async fn test_watch_refresh_reloads_then_quits() {
        let tmp = TempDir::new().unwrap();
        let mut cache = cache_with(&tmp, 1);
        let path = cache.path().to_path_buf();
        let mut seen = Vec::new();

        // first render happens on the immediate tick, before any input
        let input: &[u8] = b"r\nq\n";
        let mut first = true;
        let renders = watch_dashboard(
            &mut cache,
            &DashboardOptions::default(),
            chrono_tz::UTC,
            Duration::from_secs(3600),
            input,
            |state| {
                seen.push(views_of(state));
                if first {
                    first = false;
                    HistoryTable::new(vec![snapshot("AAAAAAAAAAA", "2025-05-01", 7)])
                        .save(&path)
                        .unwrap();
                }
                Ok(())
            },
        )
        .await
        .unwrap();

        assert_eq!(renders, 2);
        assert_eq!(seen, vec![Some(1), Some(7)]);
    }
}
