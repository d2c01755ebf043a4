//! Time-boxed cache of the loaded history table

use crate::error::Result;
use crate::history::HistoryTable;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct Cached {
    table: Arc<HistoryTable>,
    loaded_at: Instant,
}

/// Holds the last loaded table until its TTL runs out or it is invalidated
pub struct HistoryCache {
    path: PathBuf,
    ttl: Duration,
    entry: Option<Cached>,
}

impl HistoryCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            entry: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached table, reloading from disk when missing or expired
    pub fn get(&mut self) -> Result<Arc<HistoryTable>> {
        if let Some(entry) = self.entry.as_ref().filter(|e| e.loaded_at.elapsed() < self.ttl) {
            return Ok(Arc::clone(&entry.table));
        }

        debug!("Loading history table from {}", self.path.display());
        let table = Arc::new(HistoryTable::load(&self.path)?);
        self.entry = Some(Cached {
            table: Arc::clone(&table),
            loaded_at: Instant::now(),
        });
        Ok(table)
    }

    /// Drop the cached table; the next `get` reads the file again
    pub fn invalidate(&mut self) {
        debug!("History cache invalidated");
        self.entry = None;
    }

    pub fn is_fresh(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|e| e.loaded_at.elapsed() < self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::snapshot;
    use tempfile::TempDir;

    fn write_table(path: &Path, views: u64) {
        HistoryTable::new(vec![snapshot("AAAAAAAAAAA", "2025-05-01", views)])
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_serves_cached_table_within_ttl() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.csv");
        write_table(&path, 1);

        let mut cache = HistoryCache::new(&path, Duration::from_secs(3600));
        assert!(!cache.is_fresh());
        assert_eq!(cache.get().unwrap().rows()[0].views, 1);
        assert!(cache.is_fresh());

        write_table(&path, 2);
        assert_eq!(cache.get().unwrap().rows()[0].views, 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.csv");
        write_table(&path, 1);

        let mut cache = HistoryCache::new(&path, Duration::from_secs(3600));
        cache.get().unwrap();
        write_table(&path, 2);

        cache.invalidate();
        assert!(!cache.is_fresh());
        assert_eq!(cache.get().unwrap().rows()[0].views, 2);
    }

    #[test]
    fn test_zero_ttl_always_reloads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.csv");
        write_table(&path, 1);

        let mut cache = HistoryCache::new(&path, Duration::ZERO);
        cache.get().unwrap();
        write_table(&path, 3);
        assert_eq!(cache.get().unwrap().rows()[0].views, 3);
    }

    #[test]
    fn test_missing_file_is_empty_table() {
        let tmp = TempDir::new().unwrap();
        let mut cache = HistoryCache::new(tmp.path().join("absent.csv"), Duration::from_secs(60));
        assert!(cache.get().unwrap().is_empty());
    }
}
