//! Snapshot history table
//!
//! This module provides:
//! - Tolerant CSV loading (header lookup by name, coerced cells); rows and
//!   columns it cannot interpret are carried through untouched
//! - Merge with last-write-wins dedupe on `(video_id, date)`
//! - Atomic rewrite of the whole table

mod row;

pub use row::*;

use crate::error::Result;
use chrono::NaiveDate;
use csv::{ByteRecord, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persisted column order
pub const COLUMNS: [&str; 10] = [
    "date",
    "video_id",
    "views",
    "likes",
    "comments",
    "title",
    "channel_title",
    "published_at",
    "thumbnail_url",
    "video_url",
];

/// Maps a file's columns onto the persisted layout
struct Layout {
    /// File index of each of `COLUMNS`
    known: Vec<Option<usize>>,
    /// File indices of every other named column, in file order
    extra: Vec<usize>,
    width: usize,
}

impl Layout {
    fn from_headers(headers: &ByteRecord) -> Self {
        let names: Vec<String> = headers
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();
        let known: Vec<Option<usize>> = COLUMNS
            .iter()
            .map(|column| names.iter().position(|name| name == column))
            .collect();
        let extra = (0..names.len())
            .filter(|i| !known.contains(&Some(*i)))
            .collect();
        Self {
            known,
            extra,
            width: names.len(),
        }
    }

    /// Cells outside the known columns, then any cells past the header width
    fn extra_cells<'r>(&self, record: &'r ByteRecord) -> Vec<&'r [u8]> {
        let mut cells: Vec<&[u8]> = self
            .extra
            .iter()
            .map(|i| record.get(*i).unwrap_or_default())
            .collect();
        cells.extend(record.iter().skip(self.width));
        cells
    }

    /// Same record with its cells in persisted column order
    fn rearrange(&self, record: &ByteRecord) -> ByteRecord {
        let mut out = ByteRecord::new();
        for idx in &self.known {
            out.push_field(idx.and_then(|i| record.get(i)).unwrap_or_default());
        }
        for cell in self.extra_cells(record) {
            out.push_field(cell);
        }
        out
    }

    /// Interpret a record; None when it is not UTF-8 or has no video_id
    fn parse(&self, record: &ByteRecord) -> Option<SnapshotRow> {
        let text = StringRecord::from_byte_record(record.clone()).ok()?;
        let cell = |column: usize| {
            self.known[column]
                .and_then(|i| text.get(i))
                .map(str::trim)
                .unwrap_or("")
        };

        let video_id = cell(1);
        if video_id.is_empty() {
            return None;
        }

        Some(SnapshotRow {
            date: SnapshotDate::parse(cell(0)),
            video_id: video_id.to_string(),
            views: parse_count(cell(2)),
            likes: parse_count(cell(3)),
            comments: parse_count(cell(4)),
            title: cell(5).to_string(),
            channel_title: cell(6).to_string(),
            published_at: cell(7).to_string(),
            thumbnail_url: cell(8).to_string(),
            video_url: cell(9).to_string(),
            extra: self
                .extra_cells(record)
                .into_iter()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect(),
        })
    }
}

/// Outcome of merging freshly fetched rows into the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub previous_rows: usize,
    pub incoming_rows: usize,
    /// Incoming rows that replaced an existing `(video_id, date)` row
    pub replaced_rows: usize,
    pub total_rows: usize,
}

/// Ordered collection of snapshot rows
///
/// Rows that cannot be interpreted are never dropped: they stay out of every
/// computation but are written back, unchanged, after the interpreted rows.
#[derive(Debug, Clone, Default)]
pub struct HistoryTable {
    rows: Vec<SnapshotRow>,
    /// Header names of columns outside `COLUMNS`
    extra_columns: Vec<Vec<u8>>,
    /// Uninterpretable records, already in persisted column order
    unparsed: Vec<ByteRecord>,
}

impl HistoryTable {
    pub fn new(rows: Vec<SnapshotRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows kept on disk but excluded from computations
    pub fn skipped(&self) -> usize {
        self.unparsed.len()
    }

    /// Load the table; a missing or zero-length file is an empty table
    pub fn load(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No history at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
            Ok(meta) if meta.is_dir() => {
                return Err(io::Error::other(format!("{} is a directory", path.display())).into());
            }
            Ok(meta) if meta.len() == 0 => {
                debug!("History at {} is empty", path.display());
                return Ok(Self::default());
            }
            Ok(_) => {}
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.byte_headers()?.clone();
        let layout = Layout::from_headers(&headers);

        let mut table = Self {
            extra_columns: layout.extra.iter().map(|i| headers[*i].to_vec()).collect(),
            ..Self::default()
        };
        for record in reader.byte_records() {
            let record = record?;
            match layout.parse(&record) {
                Some(row) => table.rows.push(row),
                None => table.unparsed.push(layout.rearrange(&record)),
            }
        }

        if table.skipped() > 0 {
            warn!(
                "{} row(s) in {} could not be read; they are kept as-is",
                table.skipped(),
                path.display()
            );
        }
        debug!("Loaded {} history rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Append rows, sort by `(video_id, date)` and keep the last row per key
    pub fn merge(&mut self, incoming: Vec<SnapshotRow>) -> MergeStats {
        let previous_rows = self.rows.len();
        let incoming_rows = incoming.len();

        let mut all = std::mem::take(&mut self.rows);
        all.extend(incoming);
        // stable: equal keys keep append order, so the last one is the newest
        all.sort_by(|a, b| {
            a.video_id
                .cmp(&b.video_id)
                .then_with(|| a.date.cmp(&b.date))
        });

        let mut merged: Vec<SnapshotRow> = Vec::with_capacity(all.len());
        for row in all {
            match merged.last_mut() {
                Some(last) if last.video_id == row.video_id && last.date == row.date => {
                    *last = row;
                }
                _ => merged.push(row),
            }
        }

        self.rows = merged;
        let total_rows = self.rows.len();
        MergeStats {
            previous_rows,
            incoming_rows,
            replaced_rows: (previous_rows + incoming_rows).saturating_sub(total_rows),
            total_rows,
        }
    }

    /// Rewrite the table atomically: temp file in the same directory, then rename
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "history.csv".to_string());
        let tmp_path = parent.join(format!(".{}.tmp", file_name));

        let write_result = self.write_to(&tmp_path);
        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, path)?;
        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);

        let mut header = ByteRecord::from(COLUMNS.to_vec());
        for name in &self.extra_columns {
            header.push_field(name);
        }
        writer.write_byte_record(&header)?;
        let width = header.len();

        for row in &self.rows {
            let mut fields = vec![
                row.date.to_string(),
                row.video_id.clone(),
                row.views.to_string(),
                row.likes.to_string(),
                row.comments.to_string(),
                row.title.clone(),
                row.channel_title.clone(),
                row.published_at.clone(),
                row.thumbnail_url.clone(),
                row.video_url.clone(),
            ];
            fields.extend(row.extra.iter().cloned());
            if fields.len() < width {
                fields.resize(width, String::new());
            }
            writer.write_record(&fields)?;
        }
        for record in &self.unparsed {
            writer.write_byte_record(record)?;
        }

        let mut file = writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    /// Distinct video IDs, sorted
    pub fn video_ids(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.video_id.as_str()).collect()
    }

    /// Distinct non-empty channel titles, sorted
    pub fn channels(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .map(|r| r.channel_title.as_str())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Earliest and latest known day
    pub fn day_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut days = self.rows.iter().filter_map(SnapshotRow::day);
        let first = days.next()?;
        Some(days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}
