use anyhow::Result;
use std::time::Duration;

use super::classify::Site;
use super::config::CrawlerConfig;
use super::frontier::Frontier;

/// Backoff level shared by every fetch of a run. It only ever goes up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RateState {
    level: u32,
}

impl RateState {
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Called once per failed fetch
    pub fn raise(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    /// Request timeout: one unit more than the current level
    pub fn timeout(&self, unit: Duration) -> Duration {
        unit * (self.level + 1)
    }

    /// Pause after a successful fetch, zero until the first failure
    pub fn delay(&self, unit: Duration) -> Duration {
        unit * self.level
    }
}

/// Current state of the crawler
pub struct CrawlerState {
    pub frontier: Frontier,
    pub rate: RateState,
    /// Pages fetched successfully, whatever their status code
    pub pages_fetched: usize,
    pub pages_skipped: usize,
    pub pages_errored: usize,
}

impl CrawlerState {
    /// Builds the state with the seed as the first frontier entry.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let site = Site::new(&config.starting_url, config.blacklist.clone())?;
        let root = site.root.clone();
        let mut frontier = Frontier::new(site);
        frontier.enqueue(&root, None);

        Ok(Self {
            frontier,
            rate: RateState::default(),
            pages_fetched: 0,
            pages_skipped: 0,
            pages_errored: 0,
        })
    }
}
