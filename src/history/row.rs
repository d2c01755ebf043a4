use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Calendar day a snapshot was taken, or the raw cell when it did not parse
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SnapshotDate {
    Unknown(String),
    Day(NaiveDate),
}

impl SnapshotDate {
    /// Parse a date cell; instants are normalized to UTC before taking the day
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Self::Day(day);
        }
        if let Some(instant) = parse_instant(s) {
            return Self::Day(instant.date_naive());
        }
        Self::Unknown(s.to_string())
    }

    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            Self::Day(day) => Some(*day),
            Self::Unknown(_) => None,
        }
    }
}

// Unknown dates sort before every known day.
impl Ord for SnapshotDate {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Day(a), Self::Day(b)) => a.cmp(b),
            (Self::Unknown(a), Self::Unknown(b)) => a.cmp(b),
            (Self::Unknown(_), Self::Day(_)) => Ordering::Less,
            (Self::Day(_), Self::Unknown(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SnapshotDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SnapshotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

impl From<NaiveDate> for SnapshotDate {
    fn from(day: NaiveDate) -> Self {
        Self::Day(day)
    }
}

impl Serialize for SnapshotDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse an RFC 3339 or `YYYY-MM-DD HH:MM:SS[+zz:zz]` instant as UTC
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a counter cell; anything unparsable counts as zero
pub fn parse_count(raw: &str) -> u64 {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u64>() {
        return n;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

/// One observation of one video on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRow {
    pub date: SnapshotDate,
    pub video_id: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
    pub thumbnail_url: String,
    pub video_url: String,
    /// Cells of columns this tool does not know, written back unchanged
    #[serde(skip)]
    pub extra: Vec<String>,
}

impl SnapshotRow {
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.day()
    }

    /// Publication instant, when the stored value parses
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_instant(&self.published_at)
    }

    /// Whole days between publication and `now`
    pub fn days_since_published(&self, now: DateTime<Utc>) -> Option<i64> {
        self.published_at().map(|published| (now - published).num_days())
    }
}
