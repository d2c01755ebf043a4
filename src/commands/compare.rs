//! Compare command - per-video rollup over a date range

use crate::config::Config;
use crate::dashboard::format_count;
use crate::error::Result;
use crate::history::HistoryTable;
use crate::metrics::{summarize, DateRange, Metric, Mode, SummaryRow};
use crate::video_id::extract_video_id;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Video URLs or IDs; empty compares every video in the history
    pub videos: Vec<String>,
    pub metric: Metric,
    pub mode: Mode,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            videos: Vec::new(),
            metric: Metric::Views,
            mode: Mode::Incremental,
            from: None,
            to: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareReport {
    pub metric: Metric,
    pub mode: Mode,
    /// None when the history has no dated rows
    pub range: Option<DateRange>,
    pub rows: Vec<SummaryRow>,
}

/// Summarize the selected videos from the history table
pub fn cmd_compare(config: &Config, options: CompareOptions) -> Result<CompareReport> {
    let table = HistoryTable::load(&config.history_path())?;
    compare_table(&table, options)
}

fn compare_table(table: &HistoryTable, options: CompareOptions) -> Result<CompareReport> {
    let mut selected = Vec::with_capacity(options.videos.len());
    for reference in &options.videos {
        match extract_video_id(reference) {
            Some(id) if !selected.contains(&id) => selected.push(id),
            Some(_) => {}
            None => warn!("Skipping unresolvable reference: {}", reference),
        }
    }

    let range = DateRange::resolve(table, options.from, options.to)?;
    let rows = match &range {
        Some(range) => summarize(table, &selected, options.metric, options.mode, range),
        None => Vec::new(),
    };
    info!("Compared {} video(s)", rows.len());

    Ok(CompareReport {
        metric: options.metric,
        mode: options.mode,
        range,
        rows,
    })
}

/// Print the comparison table to console
pub fn print_compare_report(report: &CompareReport) {
    let Some(range) = &report.range else {
        println!("No data yet. Run 'yt-tracker collect' first.");
        return;
    };

    let mode = match report.mode {
        Mode::Cumulative => "cumulative",
        Mode::Incremental => "daily increase",
    };
    println!(
        "\n📊 {} ({}) from {} to {}\n",
        report.metric, mode, range.start, range.end
    );

    if report.rows.is_empty() {
        println!("No observations in range.");
        return;
    }

    println!(
        "{:<11}  {:<10}  {:<10}  {:>4}  {:>14}  {:>12}  {:>12}  Title",
        "Video", "First", "Last", "Obs", "Total", "Avg/day", "Peak"
    );
    for row in &report.rows {
        println!(
            "{:<11}  {:<10}  {:<10}  {:>4}  {:>14}  {:>12.1}  {:>12}  {}",
            row.video_id,
            row.first_day,
            row.last_day,
            row.observations,
            format_count(row.total),
            row.daily_average,
            format_count(row.peak),
            row.title
        );
    }
}
