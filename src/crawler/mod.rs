pub mod canonical;
pub mod classify;
pub mod config;
pub mod frontier;
pub mod robots;
pub mod runner;
pub mod scrape;
pub mod state;


pub use canonical::{Rejection, canonicalize};
pub use classify::{Finding, Site, classify_href, extract_findings};
pub use config::{CrawlerConfig, RATE_UNIT_MS, ROBOTS_REQUEST_TIMEOUT_SEC};
pub use frontier::{Category, Frontier, OrderedSet};
pub use robots::{load_seeds, parse_robots};
pub use runner::crawl;
pub use scrape::{ScrapedPage, build_client, scrape_page};
pub use state::{CrawlerState, RateState};
