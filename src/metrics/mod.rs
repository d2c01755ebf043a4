//! Time-series metrics over the snapshot history
//!
//! Deltas are always computed over a video's full history and only then
//! filtered to a date range, so the first in-range day keeps its true delta.
//! Negative deltas (upstream recounts) are clamped to zero.

mod summary;

pub use summary::*;

use crate::error::{Error, Result};
use crate::history::{HistoryTable, SnapshotRow};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Counter tracked per snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Views,
    Likes,
    Comments,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Views, Metric::Likes, Metric::Comments];

    pub fn value(self, row: &SnapshotRow) -> u64 {
        match self {
            Metric::Views => row.views,
            Metric::Likes => row.likes,
            Metric::Comments => row.comments,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Views => "views",
            Metric::Likes => "likes",
            Metric::Comments => "comments",
        })
    }
}

/// How a series is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Counter value at each snapshot
    Cumulative,
    /// Clamped day-over-day increase
    Incremental,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Cumulative => "cumulative",
            Mode::Incremental => "incremental",
        })
    }
}

/// Closed calendar-date interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Range from optional bounds, falling back to the table's span
    pub fn resolve(
        table: &HistoryTable,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Option<Self>> {
        let span = table.day_span();
        let start = from.or(span.map(|(lo, _)| lo));
        let end = to.or(span.map(|(_, hi)| hi));
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            _ => Ok(None),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// One point of a per-video series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub day: NaiveDate,
    pub value: u64,
}

/// Clamped first differences; the first element has no baseline and is zero
pub fn clamped_deltas(values: &[u64]) -> Vec<u64> {
    let mut deltas = Vec::with_capacity(values.len());
    let mut previous: Option<u64> = None;
    for &value in values {
        deltas.push(previous.map_or(0, |p| value.saturating_sub(p)));
        previous = Some(value);
    }
    deltas
}

/// Rows grouped per video, each group ordered by day; undated rows are left out
pub fn group_by_video(table: &HistoryTable) -> BTreeMap<&str, Vec<&SnapshotRow>> {
    let mut groups: BTreeMap<&str, Vec<&SnapshotRow>> = BTreeMap::new();
    for row in table.rows() {
        if row.day().is_some() {
            groups.entry(row.video_id.as_str()).or_default().push(row);
        }
    }
    for rows in groups.values_mut() {
        rows.sort_by_key(|r| r.day());
    }
    groups
}

/// Series values over a video's full history (rows ordered by day)
pub fn full_series(rows: &[&SnapshotRow], metric: Metric, mode: Mode) -> Vec<SeriesPoint> {
    let values: Vec<u64> = rows.iter().map(|r| metric.value(r)).collect();
    let values = match mode {
        Mode::Cumulative => values,
        Mode::Incremental => clamped_deltas(&values),
    };
    rows.iter()
        .zip(values)
        .filter_map(|(row, value)| row.day().map(|day| SeriesPoint { day, value }))
        .collect()
}

/// Series values inside `range`, computed over full history first
pub fn series_in_range(
    rows: &[&SnapshotRow],
    metric: Metric,
    mode: Mode,
    range: &DateRange,
) -> Vec<SeriesPoint> {
    full_series(rows, metric, mode)
        .into_iter()
        .filter(|p| range.contains(p.day))
        .collect()
}

/// Sum of clamped deltas inside `range`
pub fn interval_increment(rows: &[&SnapshotRow], metric: Metric, range: &DateRange) -> u64 {
    series_in_range(rows, metric, Mode::Incremental, range)
        .iter()
        .map(|p| p.value)
        .sum()
}

/// Most recent row per video (known dates beat unknown, later rows win ties)
pub fn latest_snapshots(table: &HistoryTable) -> Vec<&SnapshotRow> {
    let mut latest: HashMap<&str, &SnapshotRow> = HashMap::new();
    for row in table.rows() {
        latest
            .entry(row.video_id.as_str())
            .and_modify(|current| {
                if row.date >= current.date {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    let mut rows: Vec<&SnapshotRow> = latest.into_values().collect();
    rows.sort_by(|a, b| a.video_id.cmp(&b.video_id));
    rows
}

/// Interval increments of every metric summed over a set of videos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntervalTotals {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl IntervalTotals {
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Views => self.views,
            Metric::Likes => self.likes,
            Metric::Comments => self.comments,
        }
    }
}

pub fn interval_totals(
    table: &HistoryTable,
    selected: &HashSet<&str>,
    range: &DateRange,
) -> IntervalTotals {
    let mut totals = IntervalTotals::default();
    for (video_id, rows) in group_by_video(table) {
        if !selected.contains(video_id) {
            continue;
        }
        totals.views += interval_increment(&rows, Metric::Views, range);
        totals.likes += interval_increment(&rows, Metric::Likes, range);
        totals.comments += interval_increment(&rows, Metric::Comments, range);
    }
    totals
}
