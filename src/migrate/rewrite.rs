//! Literal span replacement over a document.
//!
//! Each matched span maps to the Markdown image that replaces it. Spans
//! are replaced as plain text, every occurrence, in insertion order.

use rustc_hash::FxHashMap;

use crate::core::{ImageRef, RefKind};

/// Insertion-ordered span → replacement map with unique keys.
#[derive(Debug, Default)]
pub struct ReplacementMap {
    entries: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `span` already has a replacement.
    #[inline]
    pub fn contains(&self, span: &str) -> bool {
        self.index.contains_key(span)
    }

    /// Record a replacement. The first replacement for a span wins.
    pub fn insert(&mut self, span: &str, replacement: String) -> bool {
        if self.contains(span) {
            return false;
        }
        self.index.insert(span.to_string(), self.entries.len());
        self.entries.push((span.to_string(), replacement));
        true
    }

    #[cfg(test)]
    pub fn get(&self, span: &str) -> Option<&str> {
        self.index.get(span).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every occurrence of every span, returning the new text and
    /// whether it differs from the input.
    pub fn apply(&self, text: &str) -> (String, bool) {
        let mut out = text.to_string();
        for (span, replacement) in &self.entries {
            if out.contains(span.as_str()) {
                out = out.replace(span.as_str(), replacement);
            }
        }
        let changed = out != text;
        (out, changed)
    }
}

// ============================================================================
// Alt text policies
// ============================================================================

/// `{% img %}` captions: quotes removed, trimmed, filename if empty.
pub fn tag_caption_alt(caption: Option<&str>, filename: &str) -> String {
    let alt: String = caption
        .unwrap_or_default()
        .chars()
        .filter(|c| !matches!(c, '"' | '\''))
        .collect();
    let alt = alt.trim();
    if alt.is_empty() { filename.to_string() } else { alt.to_string() }
}

/// `{% asset_img %}` captions: trimmed as written, filename if empty.
pub fn asset_caption_alt(caption: Option<&str>, filename: &str) -> String {
    match caption.map(str::trim) {
        Some(alt) if !alt.is_empty() => alt.to_string(),
        _ => filename.to_string(),
    }
}

/// Build the Markdown image that replaces `image` once it lives at `public_url`.
pub fn replacement(image: &ImageRef<'_>, public_url: &str) -> String {
    match image.kind {
        RefKind::ExternalTag => {
            let alt = tag_caption_alt(image.alt, &image.filename);
            format!("![{alt}]({public_url})")
        }
        RefKind::LocalAsset => {
            let alt = asset_caption_alt(image.alt, &image.filename);
            format!("![{alt}]({public_url})")
        }
        RefKind::MarkdownImage => {
            let alt = image.alt.unwrap_or_default();
            match image.title {
                Some(title) => format!("![{alt}]({public_url} \"{title}\")"),
                None => format!("![{alt}]({public_url})"),
            }
        }
    }
}
