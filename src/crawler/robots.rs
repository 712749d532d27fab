use log2::{debug, info, trace, warn};
use reqwest::Client;
use std::time::Duration;

use super::classify::Site;
use super::config::ROBOTS_REQUEST_TIMEOUT_SEC;

/// Lines that never carry a path
const IGNORED_DIRECTIVES: [&str; 7] = [
    "user-agent",
    "crawl-delay",
    "host:",
    "clean-param",
    "request-rate",
    "visit-time",
    "daumwebmastertool",
];

/// Directive keys that show up as standalone tokens
const DIRECTIVE_KEYS: [&str; 3] = ["disallow:", "allow:", "sitemap:"];

/// Fetches `/robots.txt` from the seed origin and returns the canonical URLs it mentions.
/// Any failure yields no seeds.
pub async fn load_seeds(client: &Client, site: &Site) -> Vec<String> {
    let robots_url = match site.root_url.join("/robots.txt") {
        Ok(url) => url,
        Err(e) => {
            warn!("Cannot build robots.txt URL from {}: {}", site.root, e);
            return Vec::new();
        }
    };

    let response = client
        .get(robots_url.clone())
        .timeout(Duration::from_secs(ROBOTS_REQUEST_TIMEOUT_SEC))
        .send()
        .await;

    let body = match response {
        Ok(response) if response.status().is_success() => response.text().await,
        Ok(response) => {
            info!("No robots.txt at {} ({})", robots_url, response.status());
            return Vec::new();
        }
        Err(e) => {
            warn!("while trying to get {}: {}", robots_url, e);
            return Vec::new();
        }
    };

    match body {
        Ok(body) => {
            let seeds = parse_robots(&body, site);
            info!("Found {} seed(s) in {}", seeds.len(), robots_url);
            seeds
        }
        Err(e) => {
            warn!("while reading {}: {}", robots_url, e);
            Vec::new()
        }
    }
}

/// Pulls every path or same-site URL out of a robots.txt body.
/// Wildcard patterns are kept; the scheduler skips them later.
pub fn parse_robots(body: &str, site: &Site) -> Vec<String> {
    let mut seeds = Vec::new();

    for line in body.to_lowercase().lines() {
        let line = line.trim();
        if line.starts_with('#') || IGNORED_DIRECTIVES.iter().any(|d| line.starts_with(d)) {
            continue;
        }

        for word in line.split_whitespace() {
            if DIRECTIVE_KEYS.contains(&word) {
                continue;
            }
            let foreign = (word.starts_with("http:") || word.starts_with("https:")) && !word.starts_with(&site.root);
            if foreign {
                trace!("Ignoring foreign robots.txt entry {}", word);
                continue;
            }
            match site.canonicalize(word, &site.root_url) {
                Ok(url) => {
                    debug!("robots.txt seed {}", url);
                    seeds.push(url);
                }
                Err(rejection) => trace!("Rejected robots.txt entry {}: {}", word, rejection),
            }
        }
    }

    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn site() -> Site {
        let seed = Url::parse("http://example.com").unwrap();
        Site::new(&seed, vec!["private".to_string()]).unwrap()
    }

    #[test]
    fn test_parse_paths_and_sitemap() {
        let body = "User-agent: *\n\
                    Disallow: /Admin/\n\
                    Allow: /public?x=1\n\
                    Crawl-delay: 10\n\
                    # Disallow: /commented\n\
                    Sitemap: http://example.com/sitemap.xml\n\
                    Sitemap: https://cdn.other.org/sitemap.xml\n";
        let seeds = parse_robots(body, &site());
        assert_eq!(
            seeds,
            vec![
                "http://example.com/admin",
                "http://example.com/public",
                "http://example.com/sitemap.xml",
            ]
        );
    }

    #[test]
    fn test_wildcards_are_kept() {
        let seeds = parse_robots("Disallow: /*.php$\nDisallow: /search/*\n", &site());
        assert_eq!(seeds, vec!["http://example.com/*.php$", "http://example.com/search/*"]);
    }

    #[test]
    fn test_blacklist_and_blank_lines() {
        let seeds = parse_robots("\r\n\nDisallow: /private/\r\nDisallow:\r\nHost: example.com\r\n", &site());
        assert!(seeds.is_empty());
    }

    #[test]
    fn test_vendor_directives_skipped() {
        let seeds = parse_robots("DaumWebMasterTool:abc123\nClean-param: ref /articles/\n", &site());
        assert!(seeds.is_empty());
    }
}
