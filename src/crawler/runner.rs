use anyhow::Result;
use log2::*;
use reqwest::Client;
use tokio::time::sleep;

use crate::link_graph::{PageId, PageStatus, SkipReason};
use crate::output::OutputDir;

use super::classify::Finding;
use super::config::CrawlerConfig;
use super::robots::load_seeds;
use super::scrape::scrape_page;
use super::state::CrawlerState;

/// Marks robots.txt patterns that cannot be fetched
const WILDCARD: char = '*';

/// Runs the crawl to completion: robots.txt seeding, then one page at a time
/// in discovery order until the frontier is empty.
/// A failed page raises the backoff level for every later request and is not retried.
/// Only output I/O errors end the run early.
pub async fn crawl(
    state: &mut CrawlerState,
    config: &CrawlerConfig,
    client: &Client,
    mut sink: Option<&mut OutputDir>,
) -> Result<()> {
    if let Some(sink) = sink.as_deref_mut() {
        for (_, page) in state.frontier.graph.pages() {
            sink.write_page(&page.url)?;
        }
    }

    if config.use_robots {
        seed_from_robots(state, client, sink.as_deref_mut()).await?;
    }

    while let Some(id) = state.frontier.dequeue_next() {
        let url = state.frontier.graph.page(id).url.clone();

        if url.contains(WILDCARD) {
            state.frontier.graph.transition(id, PageStatus::Skipped(SkipReason::Malformed));
            state.pages_skipped += 1;
            info!("skipping: {}", url);
            continue;
        }

        state.frontier.graph.transition(id, PageStatus::Fetching);
        info!("scanning: {} ({} pending)", url, state.frontier.pending());

        let timeout = state.rate.timeout(config.rate_unit);
        match scrape_page(client, &url, timeout, state.frontier.site()).await {
            Ok(page) => {
                state.frontier.graph.transition(id, PageStatus::Visited(page.status));
                state.pages_fetched += 1;
                fold_findings(state, id, page.findings, sink.as_deref_mut())?;
                debug!("{} links out of {}", state.frontier.graph.children(id).len(), url);

                let delay = state.rate.delay(config.rate_unit);
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
            Err(e) => {
                state.frontier.graph.transition(id, PageStatus::Errored(e.to_string()));
                state.pages_errored += 1;
                let level = state.rate.raise();
                warn!("error: {}: {}", url, e);
                warn!("raising rate limit to {}", level);
            }
        }
    }

    info!(
        "Crawl finished: {} fetched, {} skipped, {} errored, rate limit {}",
        state.pages_fetched,
        state.pages_skipped,
        state.pages_errored,
        state.rate.level()
    );
    Ok(())
}

async fn seed_from_robots(state: &mut CrawlerState, client: &Client, mut sink: Option<&mut OutputDir>) -> Result<()> {
    let seeds = load_seeds(client, state.frontier.site()).await;
    let root = state.frontier.site().root.clone();
    let root_id = state.frontier.graph.find(&root);

    for seed in seeds {
        if state.frontier.enqueue(&seed, root_id) {
            if let Some(sink) = sink.as_deref_mut() {
                sink.write_page(&seed)?;
            }
        }
    }
    Ok(())
}

/// Folds the references of one page into the frontier, writing each new entry once.
fn fold_findings(
    state: &mut CrawlerState,
    parent: PageId,
    findings: Vec<Finding>,
    mut sink: Option<&mut OutputDir>,
) -> Result<()> {
    for finding in findings {
        match finding {
            Finding::Page(url) => {
                if state.frontier.enqueue(&url, Some(parent)) {
                    debug!("new page {}", url);
                    if let Some(sink) = sink.as_deref_mut() {
                        sink.write_page(&url)?;
                    }
                }
            }
            Finding::Record(category, value) => {
                if state.frontier.record(category, &value) {
                    debug!("new {:?} {}", category, value);
                    if let Some(sink) = sink.as_deref_mut() {
                        sink.write_record(category, &value)?;
                    }
                }
            }
        }
    }
    Ok(())
}
