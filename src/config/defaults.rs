//! Default values for configuration

/// Default videos.list endpoint
pub fn default_api_base_url() -> String {
    "https://www.googleapis.com/youtube/v3/videos".to_string()
}

/// Default environment variable holding the API key
pub fn default_api_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}

/// Default number of IDs per videos.list call
pub fn default_batch_size() -> usize {
    25
}

/// Default request timeout in seconds
pub fn default_api_timeout() -> u64 {
    20
}

/// Default backoff schedule: immediately, then 2s, then 5s
pub fn default_retry_delays() -> Vec<u64> {
    vec![0, 2, 5]
}

/// Default: pick up proxies from the environment
pub fn default_use_env_proxy() -> bool {
    true
}

/// Default user agent
pub fn default_user_agent() -> String {
    format!("yt-tracker/{}", env!("CARGO_PKG_VERSION"))
}

/// Default input file with video references
pub fn default_input_file() -> String {
    "inputs/videos.csv".to_string()
}

/// Default snapshot history file
pub fn default_history_file() -> String {
    "data/history.csv".to_string()
}

/// Default reference time zone for snapshot days
pub fn default_time_zone() -> String {
    "America/Los_Angeles".to_string()
}

/// Default table cache lifetime (5 minutes)
pub fn default_cache_ttl() -> u64 {
    300
}

/// Default watch-mode refresh interval (5 minutes)
pub fn default_refresh_secs() -> u64 {
    300
}

/// Default sparkline width in characters
pub fn default_sparkline_width() -> usize {
    40
}
