//! Child link discovery
//!
//! A crawl stays on its own site: only links rooted at the site URL (or at
//! `/`) are followed, and only when they point at an HTML page.

use crate::LemmaSearchError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Reduces a configured site URL to the stored `scheme://host[:port]` form
///
/// # Example
///
/// ```
/// use lemma_search::crawler::normalize_site_url;
///
/// let url = normalize_site_url("https://Example.com/news/").unwrap();
/// assert_eq!(url, "https://example.com");
/// ```
pub fn normalize_site_url(url: &str) -> Result<String, LemmaSearchError> {
    let parsed = Url::parse(url.trim())?;
    let host = parsed
        .host_str()
        .ok_or(LemmaSearchError::UrlParse(::url::ParseError::EmptyHost))?;

    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Rewrites a page URL with its site part in `scheme://host[:port]` form
///
/// Returns None for URLs that cannot be parsed or carry no host.
pub fn normalize_page_url(url: &str) -> Option<String> {
    let url = url.trim();
    let site = normalize_site_url(url).ok()?;
    let path = relative_path(url)?;
    Some(format!("{}{}", site, path))
}

/// Returns true if `url` lies under the site rooted at `root`
///
/// The root must be followed by a path or query separator so that
/// `https://host.evil` is not mistaken for a page of `https://host`.
pub fn is_within_site(url: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    match url.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// Decides whether an `href` found on a page of `root` should be crawled
///
/// Accepted links are root-relative or absolute under `root`, carry no
/// fragment, and either have no extension or an `.htm`/`.html` one.
pub fn is_valid_child_link(link: &str, root: &str) -> bool {
    if !(link.starts_with('/') || is_within_site(link, root)) {
        return false;
    }
    if link.contains('#') || link.starts_with("//") {
        return false;
    }

    let Some(path) = relative_path(link) else {
        return false;
    };
    let path = path.split('?').next().unwrap_or_default().to_lowercase();

    !path.contains('.') || path.find(".htm").map_or(false, |index| index > 0)
}

/// Converts a link into the path stored for a page
///
/// Root-relative links are returned unchanged. Absolute links keep their
/// path and query. An empty path becomes `/`.
pub fn relative_path(link: &str) -> Option<String> {
    if link.starts_with('/') {
        return Some(link.to_string());
    }

    let parsed = Url::parse(link).ok()?;
    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }

    if path.trim().is_empty() {
        Some("/".to_string())
    } else {
        Some(path)
    }
}

/// Extracts the distinct child paths linked from a page of `root`
///
/// Order of first appearance is preserved.
pub fn extract_child_paths(html: &str, root: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if !is_valid_child_link(href, root) {
            continue;
        }
        if let Some(path) = relative_path(href) {
            if seen.insert(path.clone()) {
                paths.push(path);
            }
        }
    }

    paths
}
