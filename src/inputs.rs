//! Reading the list of tracked videos

use crate::error::{Error, Result};
use crate::video_id::extract_video_id;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the preferred input column
pub const VIDEO_COLUMN: &str = "video";

/// Video IDs resolved from the input file, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedInputs {
    pub ids: Vec<String>,
    /// References that matched no known shape
    pub unresolved: usize,
    /// References that resolved to an ID seen earlier
    pub duplicates: usize,
}

/// Resolve raw references: drop unresolvable ones, dedupe keeping the first
pub fn resolve_refs<I, S>(refs: I) -> ResolvedInputs
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut resolved = ResolvedInputs::default();
    let mut seen = HashSet::new();

    for raw in refs {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            continue;
        }
        match extract_video_id(raw) {
            Some(id) if seen.insert(id.clone()) => resolved.ids.push(id),
            Some(_) => resolved.duplicates += 1,
            None => {
                debug!("Unresolvable video reference: {:?}", raw);
                resolved.unresolved += 1;
            }
        }
    }

    resolved
}

/// Read video references from a CSV file with a tolerant header
///
/// Uses the `video` column when present, otherwise the first column. A
/// header cell that is itself a video reference is kept as data.
pub fn read_video_refs(path: &Path) -> Result<ResolvedInputs> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let named = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(VIDEO_COLUMN));
    let column = named.unwrap_or(0);

    let mut refs: Vec<String> = Vec::new();
    if named.is_none() {
        if let Some(cell) = headers.get(0).filter(|h| extract_video_id(h).is_some()) {
            refs.push(cell.to_string());
        }
    }

    for record in reader.records() {
        let record = record?;
        if let Some(cell) = record.get(column) {
            refs.push(cell.to_string());
        }
    }

    let resolved = resolve_refs(&refs);
    if resolved.unresolved > 0 {
        warn!(
            "Skipped {} unresolvable video reference(s) in {}",
            resolved.unresolved,
            path.display()
        );
    }
    if resolved.ids.is_empty() {
        warn!("No video IDs resolved from {}", path.display());
    }

    Ok(resolved)
}

/// Write an input template with just the header
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([VIDEO_COLUMN])?;
    writer.flush()?;
    Ok(())
}
