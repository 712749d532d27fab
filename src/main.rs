use anyhow::Result;
use log2::*;
use std::time::Instant;

use sitemapper::config::Config;
use sitemapper::crawler::{self, Category};

/// Indicates start time of a project, lazily initialized
pub static START_TIME: once_cell::sync::Lazy<Instant> = once_cell::sync::Lazy::new(Instant::now);

#[tokio::main]
async fn main() -> Result<()> {
    let _ = *START_TIME;
    let cfg = Config::new();
    cfg.validate()?;
    let _log2 = stdout()
        .module(true) // include module name
        .module_with_line(true) // include line number from module
        .module_filter(|module| module.starts_with("sitemapper")) // include only modules having this pattern
        .compress(false)
        .level(cfg.effective_log_level().to_string())
        .start();

    // Refuse to clobber earlier results before any request goes out
    let (crawler_config, mut state, mut output) = cfg.prepare()?;
    debug!("Blacklist: {:?}", crawler_config.blacklist);
    let client = crawler::build_client()?;

    match crawler::crawl(&mut state, &crawler_config, &client, Some(&mut output)).await {
        Ok(_) => {
            info!("Crawling completed in {:.1?}", START_TIME.elapsed());
            info!("Pages discovered: {}", state.frontier.graph.len());
            for category in Category::ALL {
                info!("{:?}: {}", category, state.frontier.records(category).len());
            }
        }
        Err(e) => {
            error!("Crawling failed: {}", e);
            return Err(e);
        }
    }

    output.write_report(&state.frontier.graph)?;
    if cfg.sort_output {
        output.sort_records()?;
    }
    info!("Results written to {}", output.path().display());

    Ok(())
}
