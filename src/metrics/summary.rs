//! Per-video comparison rollup over a date range

use super::{group_by_video, series_in_range, DateRange, Metric, Mode};
use crate::history::HistoryTable;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// One comparison row per video with observations in range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub observations: usize,
    /// Last in-range value (cumulative) or sum of in-range deltas (incremental)
    pub total: u64,
    /// Mean of the in-range per-point values
    pub daily_average: f64,
    pub peak: u64,
}

/// Summarize `selected` videos (all videos when empty); videos without
/// in-range observations are omitted
pub fn summarize(
    table: &HistoryTable,
    selected: &[String],
    metric: Metric,
    mode: Mode,
    range: &DateRange,
) -> Vec<SummaryRow> {
    let groups = group_by_video(table);
    let order: Vec<&str> = if selected.is_empty() {
        groups.keys().copied().collect()
    } else {
        let mut seen = HashSet::new();
        selected
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect()
    };

    let mut rows = Vec::new();
    for video_id in order {
        let Some(history) = groups.get(video_id) else {
            continue;
        };
        let points = series_in_range(history, metric, mode, range);
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            continue;
        };

        let total = match mode {
            Mode::Cumulative => last.value,
            Mode::Incremental => points.iter().map(|p| p.value).sum(),
        };
        let sum: u64 = points.iter().map(|p| p.value).sum();
        let peak = points.iter().map(|p| p.value).max().unwrap_or(0);
        // metadata from the newest snapshot, which carries the current title
        let newest = history[history.len() - 1];

        rows.push(SummaryRow {
            video_id: video_id.to_string(),
            title: newest.title.clone(),
            channel_title: newest.channel_title.clone(),
            first_day: first.day,
            last_day: last.day,
            observations: points.len(),
            total,
            daily_average: sum as f64 / points.len() as f64,
            peak,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::snapshot;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table() -> HistoryTable {
        HistoryTable::new(vec![
            snapshot("XXXXXXXXXXX", "2025-03-01", 100),
            snapshot("XXXXXXXXXXX", "2025-03-02", 150),
            snapshot("XXXXXXXXXXX", "2025-03-03", 140),
            snapshot("XXXXXXXXXXX", "2025-03-04", 200),
            snapshot("ZZZZZZZZZZZ", "2025-02-01", 5),
        ])
    }

    #[test]
    fn test_incremental_summary() {
        let range = DateRange::new(day("2025-03-02"), day("2025-03-04")).unwrap();
        let rows = summarize(&table(), &[], Metric::Views, Mode::Incremental, &range);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.video_id, "XXXXXXXXXXX");
        assert_eq!(row.first_day, day("2025-03-02"));
        assert_eq!(row.last_day, day("2025-03-04"));
        assert_eq!(row.observations, 3);
        assert_eq!(row.total, 110);
        assert_eq!(row.peak, 60);
        assert!((row.daily_average - 110.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_cumulative_summary() {
        let range = DateRange::new(day("2025-03-02"), day("2025-03-04")).unwrap();
        let rows = summarize(&table(), &[], Metric::Views, Mode::Cumulative, &range);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, 200);
        assert_eq!(rows[0].peak, 200);
        assert!((rows[0].daily_average - 490.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_video_without_points_in_range_is_excluded() {
        let range = DateRange::new(day("2025-03-01"), day("2025-03-31")).unwrap();
        let selected = vec!["ZZZZZZZZZZZ".to_string(), "XXXXXXXXXXX".to_string()];
        let rows = summarize(&table(), &selected, Metric::Views, Mode::Incremental, &range);

        let ids: Vec<&str> = rows.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["XXXXXXXXXXX"]);
    }

    #[test]
    fn test_selection_order_and_unknown_ids() {
        let range = DateRange::new(day("2025-01-01"), day("2025-12-31")).unwrap();
        let selected = vec![
            "ZZZZZZZZZZZ".to_string(),
            "NOTTRACKED0".to_string(),
            "XXXXXXXXXXX".to_string(),
        ];
        let rows = summarize(&table(), &selected, Metric::Likes, Mode::Cumulative, &range);

        let ids: Vec<&str> = rows.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["ZZZZZZZZZZZ", "XXXXXXXXXXX"]);
        assert_eq!(rows[1].total, 20);
    }

    #[test]
    fn test_repeated_selection_yields_one_row() {
        let range = DateRange::new(day("2025-03-01"), day("2025-03-04")).unwrap();
        let selected = vec![
            "XXXXXXXXXXX".to_string(),
            "ZZZZZZZZZZZ".to_string(),
            "XXXXXXXXXXX".to_string(),
        ];
        let rows = summarize(&table(), &selected, Metric::Views, Mode::Cumulative, &range);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].video_id, "XXXXXXXXXXX");
    }
}
