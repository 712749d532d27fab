use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::crawler::{CrawlerConfig, CrawlerState};
use crate::output::OutputDir;

/// Log levels as defined in log2 crate
#[derive(Debug, Serialize, Deserialize, Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}
/// This struct receives all program arguments while CrawlerConfig
/// describes only the crawler
#[derive(Parser, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Seed URL of the site to map
    pub url: String,
    /// Skip references containing this substring (repeatable)
    #[arg(short, long)]
    pub blacklist: Vec<String>,
    /// File with one blacklist substring per line
    #[arg(long)]
    pub blacklist_file: Option<PathBuf>,
    /// Directory the record files are written to. Must not exist yet
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,
    /// Backoff time unit in milliseconds
    #[arg(long, default_value = "1000")]
    pub rate_unit_ms: u64,
    /// Do not seed the crawl from /robots.txt
    #[arg(long)]
    pub no_robots: bool,
    /// Sort every record file once the crawl is done
    #[arg(long)]
    pub sort_output: bool,
    /// Enable verbose logging (same as --log-level trace)
    #[arg(short, long)]
    pub verbose: bool,
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", value_enum)]
    pub log_level: LogLevel,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.url).with_context(|| format!("invalid seed URL '{}'", self.url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("seed URL must use http or https, got '{}'", url.scheme());
        }
        if url.host_str().is_none() {
            anyhow::bail!("seed URL has no host: {}", self.url);
        }
        if self.rate_unit_ms == 0 {
            anyhow::bail!("rate_unit_ms must be greater than 0");
        }
        Ok(())
    }

    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Trace
        } else {
            self.log_level.clone()
        }
    }

    /// Blacklist from the command line followed by the file entries, blank lines dropped.
    pub fn blacklist(&self) -> anyhow::Result<Vec<String>> {
        let mut words: Vec<String> = self.blacklist.iter().filter(|w| !w.is_empty()).cloned().collect();
        if let Some(path) = &self.blacklist_file {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read blacklist file {}", path.display()))?;
            words.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(words)
    }

    pub fn crawler_config(&self) -> anyhow::Result<CrawlerConfig> {
        let start_url = Url::parse(&self.url).with_context(|| format!("invalid seed URL '{}'", self.url))?;
        Ok(CrawlerConfig::new(start_url)
            .with_blacklist(self.blacklist()?)
            .with_rate_unit(Duration::from_millis(self.rate_unit_ms))
            .with_robots(!self.no_robots))
    }

    /// Builds everything a run needs. The output directory is created last so a
    /// failed setup leaves nothing on disk.
    pub fn prepare(&self) -> anyhow::Result<(CrawlerConfig, CrawlerState, OutputDir)> {
        let crawler_config = self.crawler_config()?;
        let state = CrawlerState::new(&crawler_config)?;
        let output = OutputDir::create(&self.output_dir)?;
        Ok((crawler_config, state, output))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}
