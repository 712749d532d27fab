use anyhow::Result;
use log2::debug;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::classify::{Finding, Site, extract_findings};

pub const USER_AGENT: &str = concat!("sitemapper/", env!("CARGO_PKG_VERSION"));

/// A fetched page with the references found on it
#[derive(Debug)]
pub struct ScrapedPage {
    pub status: u16,
    /// URL after redirects, used as the base for relative references
    pub final_url: Url,
    pub findings: Vec<Finding>,
}

/// Shared HTTP session for the whole run. Cookies persist between requests.
pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .cookie_store(true)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Fetches `url` and extracts its references.
/// Any status code counts as a successful fetch; only transport errors fail.
pub async fn scrape_page(client: &Client, url: &str, timeout: Duration, site: &Site) -> Result<ScrapedPage> {
    let response = client.get(url).timeout(timeout).send().await?;

    let status = response.status().as_u16();
    let final_url = response.url().clone();
    let html = response.text().await?;

    let findings = extract_findings(&html, &site.rebase(&final_url), site);
    debug!("Found {} references on page {} ({})", findings.len(), final_url, status);

    Ok(ScrapedPage {
        status,
        final_url,
        findings,
    })
}
