//! HMAC-signed image urls.
//!
//! Every `<img src>` on the configured hostname gets `?sig=<hex>`, the
//! HMAC-SHA256 of the url path under a secret shared with the edge worker
//! that verifies it. Any existing query string is dropped.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use crate::utils::hash::hmac_sha256_hex;

/// `<img ... src="http(s)://...">` with either quote style.
static RE_IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img\s[^>]*?)src=(?:"(https?://[^"']+)"|'(https?://[^"']+)')"#).unwrap()
});

pub struct ImageSigner {
    domain: String,
    secret: String,
}

impl ImageSigner {
    pub fn new(domain: &str, secret: impl Into<String>) -> Self {
        Self {
            domain: domain.to_ascii_lowercase(),
            secret: secret.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Sign one url, or return it unchanged if it is malformed or on
    /// another host.
    ///
    /// `https://img.example.com/a.png?w=1` -> `https://img.example.com/a.png?sig=<hex>`
    pub fn sign_url<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        let Ok(url) = Url::parse(raw) else {
            return Cow::Borrowed(raw);
        };
        if url.host_str() != Some(self.domain.as_str()) {
            return Cow::Borrowed(raw);
        }

        let path = url.path();
        let sig = hmac_sha256_hex(self.secret.as_bytes(), path.as_bytes());
        Cow::Owned(format!("{}{path}?sig={sig}", url.origin().ascii_serialization()))
    }

    /// Sign the `src` of every `<img>` tag in `html`.
    pub fn sign_html<'a>(&self, html: &'a str) -> Cow<'a, str> {
        RE_IMG_SRC.replace_all(html, |caps: &Captures| {
            let (quote, url) = match (caps.get(2), caps.get(3)) {
                (Some(url), _) => ('"', url.as_str()),
                (None, Some(url)) => ('\'', url.as_str()),
                (None, None) => return caps[0].to_string(),
            };
            format!("{}src={quote}{}{quote}", &caps[1], self.sign_url(url))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIG: &str = "2657d8137197445ba1cd5c6d624b49fd5b818a9a79ace2a1c4f2828838781a4c";

    fn signer() -> ImageSigner {
        ImageSigner::new("Img.Example.com", "secret")
    }

    #[test]
    fn test_sign_url() {
        assert_eq!(
            signer().sign_url("https://img.example.com/blog/post/a.png"),
            format!("https://img.example.com/blog/post/a.png?sig={SIG}")
        );
    }

    #[test]
    fn test_sign_url_replaces_query_and_fragment() {
        assert_eq!(
            signer().sign_url("https://img.example.com/blog/post/a.png?w=100&sig=old#top"),
            format!("https://img.example.com/blog/post/a.png?sig={SIG}")
        );
    }

    #[test]
    fn test_sign_url_other_host_or_malformed() {
        let s = signer();
        assert_eq!(s.sign_url("https://other.org/blog/post/a.png"), "https://other.org/blog/post/a.png");
        assert_eq!(s.sign_url("https://img.example.com.evil/a.png"), "https://img.example.com.evil/a.png");
        assert!(matches!(s.sign_url("https://[broken/a.png"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sign_url_keeps_port_in_origin() {
        let out = signer().sign_url("http://img.example.com:8080/blog/post/a.png");
        assert_eq!(out, format!("http://img.example.com:8080/blog/post/a.png?sig={SIG}"));
    }

    #[test]
    fn test_sign_html() {
        let html = r#"<p><img class="x" src="https://img.example.com/blog/post/a.png" alt="a"></p><IMG src='https://img.example.com/blog/post/a.png'><img src="https://other.org/b.png">"#;
        let expected = format!(
            r#"<p><img class="x" src="https://img.example.com/blog/post/a.png?sig={SIG}" alt="a"></p><IMG src='https://img.example.com/blog/post/a.png?sig={SIG}'><img src="https://other.org/b.png">"#
        );
        assert_eq!(signer().sign_html(html), expected);
    }

    #[test]
    fn test_sign_html_ignores_non_img_and_relative() {
        let html = r#"<script src="https://img.example.com/a.js"></script><img src="/local/a.png"><a href="https://img.example.com/a.png">x</a>"#;
        let out = signer().sign_html(html);
        assert_eq!(out, html);
    }
}
