//! Shared helpers: MIME detection, UTC timestamps, hashing, pluralization.

pub mod date;
pub mod hash;
pub mod mime;

/// Return "s" suffix for plural counts
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, handling pluralization
///
/// `plural_count(1, "post")` -> `"1 post"`, `plural_count(3, "post")` -> `"3 posts"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}
