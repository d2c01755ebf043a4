//! Custom error types for yt-tracker

use thiserror::Error;

/// Main error type for yt-tracker operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing API key: set the {0} environment variable (or add it to .env)")]
    MissingApiKey(String),

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Upstream API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request failed after {attempts} attempts: {message}")]
    Transport { attempts: usize, message: String },

    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Already initialized: {0} exists (use --force to overwrite)")]
    AlreadyInitialized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Errors that should stop the process before any work is attempted
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Error::MissingApiKey(_) | Error::InputNotFound(_) | Error::Config(_)
        )
    }
}

/// Result type alias for yt-tracker
pub type Result<T> = std::result::Result<T, Error>;
