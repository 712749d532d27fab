use std::time::Duration;
use url::Url;

/// Default backoff time unit in milliseconds
pub const RATE_UNIT_MS: u64 = 1000;
/// Timeout for the robots.txt request, which runs before any backoff exists
pub const ROBOTS_REQUEST_TIMEOUT_SEC: u64 = 10;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub starting_url: Url,
    /// Substrings that make a reference ineligible
    pub blacklist: Vec<String>,
    /// Time unit the backoff level is multiplied by
    pub rate_unit: Duration,
    /// Whether robots.txt entries are used as extra seeds
    pub use_robots: bool,
}

impl CrawlerConfig {
    pub fn new(starting_url: Url) -> Self {
        Self {
            starting_url,
            blacklist: Vec::new(),
            rate_unit: Duration::from_millis(RATE_UNIT_MS),
            use_robots: true,
        }
    }

    pub fn with_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.blacklist = blacklist;
        self
    }

    pub fn with_rate_unit(mut self, unit: Duration) -> Self {
        self.rate_unit = unit;
        self
    }

    pub fn with_robots(mut self, use_robots: bool) -> Self {
        self.use_robots = use_robots;
        self
    }
}
