//! Status command implementation

use crate::config::Config;
use crate::dashboard::Freshness;
use crate::error::Result;
use crate::history::HistoryTable;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// Status information
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    /// None when running on built-in defaults
    pub config_path: Option<String>,
    pub time_zone: String,
    pub input_file: String,
    pub input_exists: bool,
    pub history_file: String,
    pub history_exists: bool,
    pub rows: usize,
    pub videos: usize,
    pub channels: usize,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub skipped_rows: usize,
    pub file_modified: Option<String>,
}

/// Summarize the configuration and history table
pub fn cmd_status(config: &Config) -> Result<StatusInfo> {
    info!("Getting status");

    let tz = config.tz()?;
    let history_path = config.history_path();
    let table = HistoryTable::load(&history_path)?;
    let span = table.day_span();
    let freshness = Freshness::observe(&table, &history_path, tz);

    Ok(StatusInfo {
        config_path: config.source.as_ref().map(|p| p.display().to_string()),
        time_zone: config.time_zone.clone(),
        input_file: config.paths.input_file.clone(),
        input_exists: config.input_path().exists(),
        history_file: config.paths.history_file.clone(),
        history_exists: history_path.exists(),
        rows: table.len(),
        videos: table.video_ids().len(),
        channels: table.channels().len(),
        first_day: span.map(|(lo, _)| lo),
        last_day: span.map(|(_, hi)| hi),
        skipped_rows: table.skipped(),
        file_modified: freshness.file_modified,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 yt-tracker Status\n");

    println!("Configuration:");
    println!(
        "  Config file: {}",
        status.config_path.as_deref().unwrap_or("(built-in defaults)")
    );
    println!("  Time zone: {}", status.time_zone);
    println!(
        "  Input file: {} {}",
        status.input_file,
        if status.input_exists { "✓" } else { "✗ (missing)" }
    );
    println!(
        "  History file: {} {}",
        status.history_file,
        if status.history_exists { "✓" } else { "✗ (not created yet)" }
    );

    println!("\nHistory:");
    println!("  Rows: {}", status.rows);
    println!("  Videos: {}", status.videos);
    println!("  Channels: {}", status.channels);
    match (status.first_day, status.last_day) {
        (Some(first), Some(last)) => println!("  Days: {} → {}", first, last),
        _ => println!("  Days: none"),
    }
    if status.skipped_rows > 0 {
        println!("  Unreadable rows (kept as-is): {}", status.skipped_rows);
    }
    if let Some(modified) = &status.file_modified {
        println!("  Last written: {}", modified);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::snapshot;
    use tempfile::TempDir;

    fn config_in(tmp: &TempDir) -> Config {
        let mut config = Config::default();
        config.time_zone = "UTC".to_string();
        config.paths.input_file = tmp.path().join("videos.csv").display().to_string();
        config.paths.history_file = tmp.path().join("history.csv").display().to_string();
        config
    }

    #[test]
    fn test_status_without_history() {
        let tmp = TempDir::new().unwrap();
        let status = cmd_status(&config_in(&tmp)).unwrap();

        assert!(!status.history_exists);
        assert!(!status.input_exists);
        assert_eq!(status.rows, 0);
        assert_eq!(status.first_day, None);
        assert_eq!(status.file_modified, None);
        assert_eq!(status.config_path, None);
    }

    #[test]
    fn test_status_counts_history() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        HistoryTable::new(vec![
            snapshot("AAAAAAAAAAA", "2025-05-01", 1),
            snapshot("AAAAAAAAAAA", "2025-05-03", 2),
            snapshot("BBBBBBBBBBB", "2025-05-02", 3),
        ])
        .save(&config.history_path())
        .unwrap();

        let status = cmd_status(&config).unwrap();
        assert!(status.history_exists);
        assert_eq!(status.rows, 3);
        assert_eq!(status.videos, 2);
        assert_eq!(status.channels, 1);
        assert_eq!(status.first_day.unwrap().to_string(), "2025-05-01");
        assert_eq!(status.last_day.unwrap().to_string(), "2025-05-03");
        assert!(status.file_modified.is_some());
    }
}
