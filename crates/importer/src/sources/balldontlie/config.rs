use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.balldontlie.io/v1";

/// Free tier allows 5 requests per minute
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(12);

#[derive(Debug, Clone)]
pub struct BallDontLieConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
    /// Additional attempts after the first failed one
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_delay: Duration,
}

impl Default for BallDontLieConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_delay: Duration::from_secs(2),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

impl BallDontLieConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}
