//! Dashboard view model over the history table
//!
//! Builds everything the terminal dashboard shows: freshness, channel list,
//! interval KPIs and one card per video with its series in range.

pub mod cache;
mod render;

pub use cache::HistoryCache;
pub use render::*;

use crate::error::Result;
use crate::history::HistoryTable;
use crate::metrics::{
    group_by_video, interval_totals, latest_snapshots, series_in_range, DateRange,
    IntervalTotals, Metric, Mode, SeriesPoint,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::Path;

/// Card ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Views,
    Likes,
    Comments,
    /// Newest publication first, unknown dates last
    Published,
}

/// Filters and display choices
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Only videos whose latest snapshot has this channel title
    pub channel: Option<String>,
    pub metric: Metric,
    pub mode: Mode,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: SortKey,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            channel: None,
            metric: Metric::Views,
            mode: Mode::Cumulative,
            from: None,
            to: None,
            sort: SortKey::Published,
        }
    }
}

/// How current the data is
#[derive(Debug, Clone, Default, Serialize)]
pub struct Freshness {
    /// Latest snapshot day in the table
    pub latest_day: Option<NaiveDate>,
    /// History file modification time in the reference time zone
    pub file_modified: Option<String>,
}

impl Freshness {
    pub fn observe(table: &HistoryTable, path: &Path, tz: Tz) -> Self {
        let file_modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(|t| {
                DateTime::<Utc>::from(t)
                    .with_timezone(&tz)
                    .format("%Y-%m-%d %H:%M:%S %Z")
                    .to_string()
            });
        Self {
            latest_day: table.day_span().map(|(_, hi)| hi),
            file_modified,
        }
    }
}

/// One video on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct VideoCard {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub published_day: Option<NaiveDate>,
    pub days_since_published: Option<i64>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    /// Metric series in range; empty when the video has no data in range
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub freshness: Freshness,
    pub channels: Vec<String>,
    pub metric: Metric,
    pub mode: Mode,
    pub range: DateRange,
    /// Interval increments over the selected videos
    pub kpis: IntervalTotals,
    pub cards: Vec<VideoCard>,
    pub skipped_rows: usize,
}

/// What the dashboard can show
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DashboardState {
    /// Nothing usable in the history table
    Empty { skipped_rows: usize },
    /// The history file could not be read at all
    Error { message: String },
    Ready(Box<DashboardView>),
}

/// Assemble the dashboard for `table`
pub fn build_dashboard(
    table: &HistoryTable,
    options: &DashboardOptions,
    freshness: Freshness,
    now: DateTime<Utc>,
) -> Result<DashboardState> {
    let Some(range) = DateRange::resolve(table, options.from, options.to)? else {
        return Ok(DashboardState::Empty {
            skipped_rows: table.skipped(),
        });
    };

    let mut latest = latest_snapshots(table);
    if let Some(channel) = &options.channel {
        latest.retain(|row| &row.channel_title == channel);
    }
    match options.sort {
        SortKey::Published => latest.sort_by_key(|row| Reverse(row.published_at())),
        SortKey::Views => latest.sort_by_key(|row| Reverse(row.views)),
        SortKey::Likes => latest.sort_by_key(|row| Reverse(row.likes)),
        SortKey::Comments => latest.sort_by_key(|row| Reverse(row.comments)),
    }

    let selected: HashSet<&str> = latest.iter().map(|r| r.video_id.as_str()).collect();
    let kpis = interval_totals(table, &selected, &range);
    let groups = group_by_video(table);

    let cards = latest
        .iter()
        .map(|row| {
            let points = groups
                .get(row.video_id.as_str())
                .map(|rows| series_in_range(rows, options.metric, options.mode, &range))
                .unwrap_or_default();
            VideoCard {
                video_id: row.video_id.clone(),
                title: row.title.clone(),
                channel_title: row.channel_title.clone(),
                video_url: row.video_url.clone(),
                thumbnail_url: row.thumbnail_url.clone(),
                published_day: row.published_at().map(|p| p.date_naive()),
                days_since_published: row.days_since_published(now),
                views: row.views,
                likes: row.likes,
                comments: row.comments,
                points,
            }
        })
        .collect();

    Ok(DashboardState::Ready(Box::new(DashboardView {
        freshness,
        channels: table.channels().into_iter().map(String::from).collect(),
        metric: options.metric,
        mode: options.mode,
        range,
        kpis,
        cards,
        skipped_rows: table.skipped(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::snapshot;
    use crate::history::SnapshotRow;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn row(video: &str, date: &str, views: u64, channel: &str, published: &str) -> SnapshotRow {
        SnapshotRow {
            channel_title: channel.to_string(),
            published_at: published.to_string(),
            ..snapshot(video, date, views)
        }
    }

    fn table() -> HistoryTable {
        HistoryTable::new(vec![
            row("AAAAAAAAAAA", "2025-05-01", 100, "Alpha", "2025-04-01T00:00:00Z"),
            row("AAAAAAAAAAA", "2025-05-02", 150, "Alpha", "2025-04-01T00:00:00Z"),
            row("BBBBBBBBBBB", "2025-05-01", 900, "Beta", "2025-05-01T00:00:00Z"),
            row("BBBBBBBBBBB", "2025-05-02", 1000, "Beta", "2025-05-01T00:00:00Z"),
            row("CCCCCCCCCCC", "2025-05-02", 10, "Alpha", "unknown"),
        ])
    }

    fn ready(state: DashboardState) -> DashboardView {
        match state {
            DashboardState::Ready(view) => *view,
            _ => panic!("expected a ready dashboard"),
        }
    }

    #[test]
    fn test_empty_table_is_empty_state() {
        let state = build_dashboard(
            &HistoryTable::default(),
            &DashboardOptions::default(),
            Freshness::default(),
            now(),
        )
        .unwrap();
        assert!(matches!(state, DashboardState::Empty { skipped_rows: 0 }));
    }

    #[test]
    fn test_published_sort_puts_unknown_last() {
        let view = ready(
            build_dashboard(&table(), &DashboardOptions::default(), Freshness::default(), now())
                .unwrap(),
        );
        let ids: Vec<&str> = view.cards.iter().map(|c| c.video_id.as_str()).collect();
        assert_eq!(ids, vec!["BBBBBBBBBBB", "AAAAAAAAAAA", "CCCCCCCCCCC"]);
        assert_eq!(view.range, DateRange::new(day("2025-05-01"), day("2025-05-02")).unwrap());
        assert_eq!(view.channels, vec!["Alpha", "Beta"]);
        assert_eq!(view.cards[0].days_since_published, Some(31));
        assert_eq!(view.cards[2].published_day, None);
    }

    #[test]
    fn test_channel_filter_and_view_sort() {
        let options = DashboardOptions {
            channel: Some("Alpha".to_string()),
            sort: SortKey::Views,
            mode: Mode::Incremental,
            ..DashboardOptions::default()
        };
        let view = ready(build_dashboard(&table(), &options, Freshness::default(), now()).unwrap());

        let ids: Vec<&str> = view.cards.iter().map(|c| c.video_id.as_str()).collect();
        assert_eq!(ids, vec!["AAAAAAAAAAA", "CCCCCCCCCCC"]);
        assert_eq!(view.kpis.views, 50);

        let values: Vec<u64> = view.cards[0].points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0, 50]);
    }

    #[test]
    fn test_range_without_points_leaves_card_empty() {
        let options = DashboardOptions {
            from: Some(day("2025-05-02")),
            to: Some(day("2025-05-02")),
            mode: Mode::Incremental,
            ..DashboardOptions::default()
        };
        let view = ready(build_dashboard(&table(), &options, Freshness::default(), now()).unwrap());

        // deltas at the range start still see the day before
        assert_eq!(view.kpis.views, 150);
        let b = view.cards.iter().find(|c| c.video_id == "BBBBBBBBBBB").unwrap();
        assert_eq!(b.points.len(), 1);
        assert_eq!(b.points[0].value, 100);

        let options = DashboardOptions {
            from: Some(day("2025-01-01")),
            to: Some(day("2025-01-31")),
            ..DashboardOptions::default()
        };
        let view = ready(build_dashboard(&table(), &options, Freshness::default(), now()).unwrap());
        assert!(view.cards.iter().all(|c| c.points.is_empty()));
        assert_eq!(view.kpis, IntervalTotals::default());
    }

    #[test]
    fn test_inverted_range_is_error() {
        let options = DashboardOptions {
            from: Some(day("2025-05-03")),
            to: Some(day("2025-05-01")),
            ..DashboardOptions::default()
        };
        assert!(build_dashboard(&table(), &options, Freshness::default(), now()).is_err());
    }

    #[test]
    fn test_freshness_reads_file_time() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("history.csv");
        table().save(&path).unwrap();

        let freshness = Freshness::observe(&table(), &path, chrono_tz::UTC);
        assert_eq!(freshness.latest_day, Some(day("2025-05-02")));
        assert!(freshness.file_modified.unwrap().ends_with("UTC"));
    }
}
