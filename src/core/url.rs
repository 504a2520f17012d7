//! Url helpers for image sources.
//!
//! Source urls are kept exactly as written in the post: the filename used
//! for storage keys is cut from the raw text, not from a re-encoded form.

use std::path::Path;

use url::Url;

use crate::utils::mime::DEFAULT_EXTENSION;

/// Filename used when a url has no final path segment.
pub const DEFAULT_FILENAME: &str = "image.png";

/// Parse an http(s) url, `None` for anything else.
pub fn parse_http(link: &str) -> Option<Url> {
    Url::parse(link)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// Derive a storage filename from a source url.
///
/// Query and fragment are dropped and the last path segment is taken.
/// An empty segment becomes [`DEFAULT_FILENAME`]; a segment without an
/// extension gets `.png` appended.
///
/// `https://host/a/b.jpg?w=100#x` -> `b.jpg`, `https://host/raw/abc` -> `abc.png`
pub fn filename_from_url(url: &str) -> String {
    let base = url.split(['?', '#']).next().unwrap_or(url);

    // Skip `scheme://authority` so a bare host is never taken as a filename
    let path = match base.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
        None => base,
    };

    let name = path.rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }
    if Path::new(name).extension().is_none() {
        return format!("{name}.{DEFAULT_EXTENSION}");
    }
    name.to_string()
}

/// Resolve a redirect `Location` header against the url that returned it.
///
/// Absolute locations replace the url; relative ones are joined.
pub fn resolve_location(current: &Url, location: &str) -> Result<Url, url::ParseError> {
    current.join(location.trim())
}

/// Check whether `url` starts with `base` (trailing `/` on `base` ignored).
///
/// Plain text prefix: `https://cdn.example.com/blog-archive/a.png` is under
/// `https://cdn.example.com/blog`. An empty base matches nothing.
pub fn is_under(url: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    !base.is_empty() && url.starts_with(base)
}
