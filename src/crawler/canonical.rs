use std::fmt;
use url::{Position, Url};

/// Why a raw reference was dropped before it became a canonical URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Ends in `../`, which only ever walks up and loops
    ParentTraversal,
    /// Contains a blacklisted substring
    Blacklisted(String),
    /// Contains `<` or `>`, left over from broken markup
    AngleBracket,
    /// `javascript:void(0)` handler, not a navigation target
    VoidHandler,
    /// Could not be resolved against the base URL
    Unresolvable,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ParentTraversal => write!(f, "parent directory traversal"),
            Rejection::Blacklisted(word) => write!(f, "blacklisted word '{}'", word),
            Rejection::AngleBracket => write!(f, "angle bracket in reference"),
            Rejection::VoidHandler => write!(f, "void script handler"),
            Rejection::Unresolvable => write!(f, "cannot be resolved against base"),
        }
    }
}

impl std::error::Error for Rejection {}

/// Placeholder text that failed attribute lookups leave behind in scraped markup.
const PLACEHOLDER: &str = "none";

/// Resolves `raw` against `base` and normalizes the result.
/// Query, fragment, placeholder tail and trailing slashes are removed;
/// scheme and host come out lower-cased from the `url` crate.
pub fn canonicalize(raw: &str, base: &Url, blacklist: &[String]) -> Result<String, Rejection> {
    if raw.ends_with("../") {
        return Err(Rejection::ParentTraversal);
    }
    if let Some(word) = blacklist.iter().find(|word| raw.contains(word.as_str())) {
        return Err(Rejection::Blacklisted(word.clone()));
    }
    if raw.contains(['<', '>']) {
        return Err(Rejection::AngleBracket);
    }
    if raw.to_ascii_lowercase().contains("javascript:void(0)") {
        return Err(Rejection::VoidHandler);
    }

    let url = base.join(raw).map_err(|_| Rejection::Unresolvable)?;

    // Slicing up to AfterPath drops the query and the fragment.
    let head = &url[..Position::BeforePath];
    let mut path = &url[Position::BeforePath..Position::AfterPath];
    if let Some(cut) = path.to_ascii_lowercase().find(PLACEHOLDER) {
        path = &path[..cut];
    }

    let canonical = format!("{}{}", head, path);
    Ok(canonical.trim_end_matches('/').to_string())
}
