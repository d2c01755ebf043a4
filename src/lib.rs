//! yt-tracker - daily YouTube statistics collection and a terminal dashboard
//!
//! The collector appends one snapshot row per video per day to a CSV history
//! table; the dashboard and comparison views derive cumulative and
//! incremental series from that table.

pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod inputs;
pub mod metrics;
pub mod progress;
pub mod video_id;
pub mod youtube;

pub use config::Config;
pub use error::{Error, Result};
