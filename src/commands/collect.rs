//! Collect command - fetch today's statistics and merge them into the history

use crate::config::Config;
use crate::error::Result;
use crate::history::{HistoryTable, MergeStats, SnapshotRow};
use crate::inputs::read_video_refs;
use crate::progress::batch_progress;
use crate::youtube::StatsSource;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// Collection statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectStats {
    pub day: Option<NaiveDate>,
    pub resolved_ids: usize,
    pub unresolved_refs: usize,
    pub duplicate_refs: usize,
    pub batches: usize,
    pub rows_fetched: usize,
    /// Requested IDs the API did not return (deleted or private videos)
    pub missing_ids: Vec<String>,
    /// None when nothing was written
    pub merge: Option<MergeStats>,
}

/// Calendar day in the reference time zone
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Fetch every tracked video and merge one row per video for `day`.
///
/// The history file is written once, after all batches succeed.
pub async fn cmd_collect(
    config: &Config,
    source: &dyn StatsSource,
    day: NaiveDate,
    quiet: bool,
) -> Result<CollectStats> {
    let inputs = read_video_refs(&config.input_path())?;
    let mut stats = CollectStats {
        day: Some(day),
        resolved_ids: inputs.ids.len(),
        unresolved_refs: inputs.unresolved,
        duplicate_refs: inputs.duplicates,
        ..Default::default()
    };

    if inputs.ids.is_empty() {
        warn!("Nothing to collect");
        return Ok(stats);
    }

    info!(
        "Collecting {} video(s) for {} in batches of {}",
        inputs.ids.len(),
        day,
        config.api.batch_size
    );

    let batches: Vec<&[String]> = inputs.ids.chunks(config.api.batch_size).collect();
    let progress = batch_progress(batches.len() as u64, quiet);
    let mut rows: Vec<SnapshotRow> = Vec::with_capacity(inputs.ids.len());

    for batch in &batches {
        let items = match source.fetch_batch(batch).await {
            Ok(items) => items,
            Err(e) => {
                progress.abandon_with_message("failed");
                return Err(e);
            }
        };
        rows.extend(items.into_iter().filter_map(|item| item.into_snapshot(day)));
        stats.batches += 1;
        progress.inc(1);
    }
    progress.finish_and_clear();

    let returned: HashSet<&str> = rows.iter().map(|r| r.video_id.as_str()).collect();
    stats.missing_ids = inputs
        .ids
        .iter()
        .filter(|id| !returned.contains(id.as_str()))
        .cloned()
        .collect();
    if !stats.missing_ids.is_empty() {
        warn!(
            "{} video(s) not returned by the API: {}",
            stats.missing_ids.len(),
            stats.missing_ids.join(", ")
        );
    }
    stats.rows_fetched = rows.len();

    let history_path = config.history_path();
    let mut table = HistoryTable::load(&history_path)?;
    let merge = table.merge(rows);
    table.save(&history_path)?;

    info!(
        "Saved {} rows. History size: {}",
        merge.incoming_rows, merge.total_rows
    );
    stats.merge = Some(merge);
    Ok(stats)
}

/// Print collection statistics to console
pub fn print_collect_stats(stats: &CollectStats) {
    println!("\n✓ Collection complete");
    if let Some(day) = stats.day {
        println!("  Day: {}", day);
    }
    println!("  Videos tracked: {}", stats.resolved_ids);
    if stats.unresolved_refs > 0 {
        println!("  Unresolvable references skipped: {}", stats.unresolved_refs);
    }
    if stats.duplicate_refs > 0 {
        println!("  Duplicate references skipped: {}", stats.duplicate_refs);
    }
    println!("  Batches: {}", stats.batches);
    println!("  Rows fetched: {}", stats.rows_fetched);
    if !stats.missing_ids.is_empty() {
        println!("  Not returned by the API: {}", stats.missing_ids.join(", "));
    }
    match &stats.merge {
        Some(merge) => {
            println!("  Replaced same-day rows: {}", merge.replaced_rows);
            println!("  History size: {}", merge.total_rows);
        }
        None => println!("  Nothing written (no video IDs resolved)"),
    }
}
