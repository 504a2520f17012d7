//! Route bucket image urls through Cloudflare's image transformation path.
//!
//! ```text
//! src="https://img.example.com/blog/p/a.png"
//!   ↓
//! src="/cdn-cgi/image/format=auto,quality=85/https://img.example.com/blog/p/a.png"
//! ```
//!
//! Rewritten places: `src`, `data-src`, `data-original`, `data-lazy-src`
//! attributes, every url inside `srcset`, and inline `url(...)`.
//! Running the transform twice leaves the output unchanged.

use std::borrow::Cow;

use regex::{Captures, Regex, RegexBuilder};

use crate::config::CdnTransformConfig;

/// Path segment Cloudflare intercepts for on-the-fly transforms.
pub const CDN_PATH: &str = "/cdn-cgi/image/";

/// Compiled transform for one base url and option set.
#[derive(Debug, Clone)]
pub struct CdnTransform {
    prefix: String,
    attr: Regex,
    srcset: Regex,
    srcset_url: Regex,
    style_url: Regex,
}

impl CdnTransform {
    /// Build for urls under `base_url`.
    ///
    /// One leading and trailing `/` is trimmed from `options`.
    pub fn new(base_url: &str, options: &str) -> Result<Self, regex::Error> {
        let base = regex::escape(base_url.trim_end_matches('/'));
        let options = options.strip_prefix('/').unwrap_or(options);
        let options = options.strip_suffix('/').unwrap_or(options);

        let build = |pattern: &str| RegexBuilder::new(pattern).case_insensitive(true).build();

        Ok(Self {
            prefix: format!("{CDN_PATH}{options}/"),
            attr: build(&format!(
                r#"((?:src|data-src|data-original|data-lazy-src)=["'])({base}/[^"' >\n]+)(["'])"#
            ))?,
            srcset: build(r#"(srcset=["'])([^"']+)(["'])"#)?,
            srcset_url: build(&format!(r"{base}/[^\s,]+"))?,
            style_url: build(&format!(r#"(url\(["']?)({base}/[^"')\s]+)(["']?\))"#))?,
        })
    }

    /// Build from the site config; `None` when disabled or no base url is set.
    pub fn from_config(config: &CdnTransformConfig) -> Result<Option<Self>, regex::Error> {
        let base = config.r2_base_url.trim();
        if !config.enable || base.is_empty() {
            return Ok(None);
        }
        Self::new(base, &config.transform_options).map(Some)
    }

    /// `/cdn-cgi/image/<options>/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn apply<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let mut html = Cow::Borrowed(html);

        let next = owned(self.attr.replace_all(&html, |caps: &Captures| {
            format!("{}{}{}{}", &caps[1], self.prefix, &caps[2], &caps[3])
        }));
        if let Some(next) = next {
            html = Cow::Owned(next);
        }

        let next = owned(self.srcset.replace_all(&html, |caps: &Captures| {
            format!("{}{}{}", &caps[1], self.rewrite_srcset(&caps[2]), &caps[3])
        }));
        if let Some(next) = next {
            html = Cow::Owned(next);
        }

        let next = owned(self.style_url.replace_all(&html, |caps: &Captures| {
            format!("{}{}{}{}", &caps[1], self.prefix, &caps[2], &caps[3])
        }));
        if let Some(next) = next {
            html = Cow::Owned(next);
        }

        html
    }

    /// Prefix each candidate url in a `srcset` value, skipping candidates
    /// that already go through the transform path.
    fn rewrite_srcset<'a>(&self, value: &'a str) -> Cow<'a, str> {
        self.srcset_url.replace_all(value, |caps: &Captures| {
            let url = &caps[0];
            let start = caps.get(0).map_or(0, |m| m.start());
            if already_prefixed(&value[..start]) {
                url.to_string()
            } else {
                format!("{}{url}", self.prefix)
            }
        })
    }
}

/// Whether the candidate ending `before` already sits behind a transform path.
///
/// Options may contain commas, so the candidate is delimited by whitespace
/// and a second `://` means another url came in between.
fn already_prefixed(before: &str) -> bool {
    let token = before.rsplit(char::is_whitespace).next().unwrap_or(before);
    token
        .rfind(CDN_PATH)
        .is_some_and(|i| !token[i + CDN_PATH.len()..].contains("://"))
}

#[inline]
fn owned(text: Cow<'_, str>) -> Option<String> {
    match text {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    }
}
