use anyhow::{Result, anyhow};
use log2::trace;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

use super::canonical::{Rejection, canonicalize};
use super::frontier::Category;

static ANCHORS: Lazy<Selector> = Lazy::new(|| selector("a"));
static FORMS: Lazy<Selector> = Lazy::new(|| selector("form"));
static SOURCES: Lazy<Selector> = Lazy::new(|| selector("[src]"));
static HANDLERS: Lazy<Selector> = Lazy::new(|| selector("[onclick]"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {}: {}", css, e))
}

/// The crawled site as seen by the classifier: its root, authority and registrable domain.
#[derive(Debug, Clone)]
pub struct Site {
    /// Canonical form of the seed URL
    pub root: String,
    pub root_url: Url,
    host: String,
    port: Option<u16>,
    /// Seed host without a leading `www.`
    pub domain: String,
    pub blacklist: Vec<String>,
}

impl Site {
    pub fn new(seed: &Url, blacklist: Vec<String>) -> Result<Self> {
        let host = seed
            .host_str()
            .ok_or_else(|| anyhow!("URL has no host: {}", seed))?
            .to_string();
        let root = canonicalize(seed.as_str(), seed, &[])
            .map_err(|e| anyhow!("Seed URL {} cannot be used: {}", seed, e))?;
        let root_url = Url::parse(&root)?;
        let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();

        Ok(Self {
            root,
            root_url,
            port: seed.port(),
            domain,
            host,
            blacklist,
        })
    }

    /// True when `url` has the same authority (host and explicit port) as the seed.
    pub fn in_scope(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => parsed.host_str() == Some(self.host.as_str()) && parsed.port() == self.port,
            Err(_) => false,
        }
    }

    /// Moves a page URL that redirected onto another authority back onto the seed's,
    /// keeping its path so relative references still resolve the same way.
    pub fn rebase(&self, url: &Url) -> Url {
        if self.in_scope(url.as_str()) {
            return url.clone();
        }
        let mut rebased = url.clone();
        match (rebased.set_host(Some(&self.host)), rebased.set_port(self.port)) {
            (Ok(()), Ok(())) => rebased,
            _ => self.root_url.clone(),
        }
    }

    pub fn canonicalize(&self, raw: &str, base: &Url) -> Result<String, Rejection> {
        canonicalize(raw, base, &self.blacklist)
    }

    /// Relative references, the site's root prefix and same-authority absolute URLs all count as internal.
    fn is_internal(&self, lowered: &str) -> bool {
        !has_scheme(lowered) || lowered.starts_with(&self.root) || self.in_scope(lowered)
    }

    fn subdomain_of(&self, lowered: &str) -> Option<String> {
        let parsed = Url::parse(lowered).ok()?;
        let host = parsed.host_str()?;
        let suffix = format!(".{}", self.domain);
        if host.ends_with(&suffix) {
            Some(format!("{}://{}", parsed.scheme(), host))
        } else {
            None
        }
    }
}

fn has_scheme(lowered: &str) -> bool {
    lowered.starts_with("http:") || lowered.starts_with("https:")
}

/// One classified reference found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Canonical URL of an internal page, goes to the frontier
    Page(String),
    Record(Category, String),
}

/// Sorts an anchor `href` into a page, email, subdomain or external reference.
pub fn classify_href(href: &str, base: &Url, site: &Site) -> Result<Finding, Rejection> {
    let lowered = href.trim().to_lowercase();

    if let Some(address) = lowered.strip_prefix("mailto:") {
        return Ok(Finding::Record(Category::Email, address.to_string()));
    }
    if lowered.contains('@') {
        return Ok(Finding::Record(Category::Email, lowered));
    }

    if site.is_internal(&lowered) {
        let url = site.canonicalize(href, base)?;
        if site.in_scope(&url) {
            return Ok(Finding::Page(url));
        }
        // protocol-relative, non-http or lookalike-prefix references
        return Ok(foreign(&url, site));
    }

    Ok(foreign(&lowered, site))
}

fn foreign(lowered: &str, site: &Site) -> Finding {
    match site.subdomain_of(lowered) {
        Some(subdomain) => Finding::Record(Category::Subdomain, subdomain),
        None => Finding::Record(Category::External, lowered.trim_end_matches('/').to_string()),
    }
}

/// Extracts every accepted reference from `html`, resolved against `base`.
/// Form actions, `src` attributes, `onclick` handlers and anchors are collected
/// in that order, each in document order.
pub fn extract_findings(html: &str, base: &Url, site: &Site) -> Vec<Finding> {
    let document = Html::parse_document(html);
    let mut findings = Vec::new();

    for form in document.select(&FORMS) {
        let Some(action) = form.value().attr("action").filter(|a| !a.is_empty()) else {
            continue;
        };
        if !site.is_internal(&action.to_lowercase()) {
            trace!("Ignoring foreign form action {}", action);
            continue;
        }
        accept(site.canonicalize(action, base), action, Category::Form, &mut findings);
    }

    for element in document.select(&SOURCES) {
        if let Some(src) = element.value().attr("src") {
            accept(site.canonicalize(src, base), src, Category::Source, &mut findings);
        }
    }

    for element in document.select(&HANDLERS) {
        if let Some(handler) = element.value().attr("onclick") {
            accept(site.canonicalize(handler, base), handler, Category::Handler, &mut findings);
        }
    }

    for anchor in document.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        match classify_href(href, base, site) {
            Ok(finding) => findings.push(finding),
            Err(rejection) => trace!("Rejected {}: {}", href, rejection),
        }
    }

    findings
}

fn accept(result: Result<String, Rejection>, raw: &str, category: Category, findings: &mut Vec<Finding>) {
    match result {
        Ok(url) => findings.push(Finding::Record(category, url)),
        Err(rejection) => trace!("Rejected {}: {}", raw, rejection),
    }
}
