//! Image reference extraction.
//!
//! Three independent matchers, one per [`RefKind`]. Each yields references
//! lazily in document order; no kind looks at another kind's matches.
//!
//! | Kind            | Syntax                                   |
//! |-----------------|------------------------------------------|
//! | `ExternalTag`   | `{% img https://host/a.png 'Caption' %}` |
//! | `LocalAsset`    | `{% asset_img a.png Caption text %}`     |
//! | `MarkdownImage` | `![alt](https://host/a.png "title")`     |

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::core::url::is_under;
use crate::core::{ImageRef, RefKind};

/// `{% img <url> ['<caption>'] %}`
static RE_HEXO_IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%\s*img\s+(https?://[^\s'"]+)(?:\s+'([^']*)')?\s*%\}"#).unwrap()
});

/// `{% asset_img <filename> [caption] %}`
static RE_ASSET_IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%\s*asset_img\s+([^\s%]+)(?:\s+([^%]*?))?\s*%\}").unwrap()
});

/// `![alt](<url> "title")`
static RE_MD_IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\((https?://[^\s)]+?)(?:\s+"([^"]*)")?\)"#).unwrap()
});

/// Extract references of one kind.
///
/// `public_base_url` only affects `MarkdownImage`: urls already under it
/// were migrated by an earlier run and are not yielded.
pub fn extract<'a>(
    kind: RefKind,
    text: &'a str,
    public_base_url: &'a str,
) -> Box<dyn Iterator<Item = ImageRef<'a>> + 'a> {
    match kind {
        RefKind::ExternalTag => Box::new(external_tags(text)),
        RefKind::LocalAsset => Box::new(local_assets(text)),
        RefKind::MarkdownImage => Box::new(markdown_images(text, public_base_url)),
    }
}

/// Find `{% img %}` tags pointing at absolute urls.
pub fn external_tags(text: &str) -> impl Iterator<Item = ImageRef<'_>> {
    RE_HEXO_IMG.captures_iter(text).map(|caps| {
        ImageRef::external(
            span(&caps),
            group(&caps, 1).unwrap_or_default(),
            group(&caps, 2),
        )
    })
}

/// Find `{% asset_img %}` tags naming a file in the post's asset folder.
pub fn local_assets(text: &str) -> impl Iterator<Item = ImageRef<'_>> {
    RE_ASSET_IMG.captures_iter(text).map(|caps| {
        ImageRef::local(
            span(&caps),
            group(&caps, 1).unwrap_or_default(),
            group(&caps, 2),
        )
    })
}

/// Find Markdown images with http(s) urls not yet under `public_base_url`.
pub fn markdown_images<'a>(
    text: &'a str,
    public_base_url: &'a str,
) -> impl Iterator<Item = ImageRef<'a>> + 'a {
    RE_MD_IMG.captures_iter(text).filter_map(move |caps| {
        let url = group(&caps, 2)?;
        if is_under(url, public_base_url) {
            return None;
        }
        Some(ImageRef::markdown(
            span(&caps),
            group(&caps, 1).unwrap_or_default(),
            url,
            group(&caps, 3),
        ))
    })
}

#[inline]
fn span<'a>(caps: &Captures<'a>) -> &'a str {
    caps.get(0).map_or("", |m| m.as_str())
}

#[inline]
fn group<'a>(caps: &Captures<'a>, index: usize) -> Option<&'a str> {
    caps.get(index).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cdn.example.com";

    #[test]
    fn test_external_tag_with_caption() {
        let text = "intro\n{% img https://host/a.png 'Caption' %}\noutro";
        let refs: Vec<_> = external_tags(text).collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, RefKind::ExternalTag);
        assert_eq!(refs[0].span, "{% img https://host/a.png 'Caption' %}");
        assert_eq!(refs[0].source, "https://host/a.png");
        assert_eq!(refs[0].filename, "a.png");
        assert_eq!(refs[0].alt, Some("Caption"));
    }

    #[test]
    fn test_external_tag_without_caption() {
        let refs: Vec<_> = external_tags("{%img http://host/x/b.jpg%}").collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].filename, "b.jpg");
        assert_eq!(refs[0].alt, None);
    }

    #[test]
    fn test_external_tag_ignores_relative_urls() {
        assert_eq!(external_tags("{% img /images/a.png %}").count(), 0);
        assert_eq!(external_tags("{% img a.png 'x' %}").count(), 0);
    }

    #[test]
    fn test_local_asset() {
        let text = "{% asset_img diagram.png %}";
        let refs: Vec<_> = local_assets(text).collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, RefKind::LocalAsset);
        assert_eq!(refs[0].span, text);
        assert_eq!(refs[0].filename, "diagram.png");
        assert_eq!(refs[0].alt, None);
    }

    #[test]
    fn test_local_asset_with_caption_text() {
        let refs: Vec<_> = local_assets("{% asset_img flow.svg  \"Data flow\" overview %}").collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].filename, "flow.svg");
        assert_eq!(refs[0].alt, Some("\"Data flow\" overview"));
    }

    #[test]
    fn test_markdown_image_with_title() {
        let text = r#"![logo](https://other.org/logo.svg "Logo")"#;
        let refs: Vec<_> = markdown_images(text, BASE).collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, RefKind::MarkdownImage);
        assert_eq!(refs[0].alt, Some("logo"));
        assert_eq!(refs[0].source, "https://other.org/logo.svg");
        assert_eq!(refs[0].title, Some("Logo"));
        assert_eq!(refs[0].filename, "logo.svg");
    }

    #[test]
    fn test_markdown_image_already_migrated_is_excluded() {
        let text = r#"![logo](https://cdn.example.com/logo.svg "Logo")"#;
        assert_eq!(markdown_images(text, BASE).count(), 0);
    }

    #[test]
    fn test_markdown_excluded_by_plain_prefix() {
        let base = "https://cdn.example.com/blog";
        let text = "![x](https://cdn.example.com/blog-archive/a.png)\n\
                    ![y](https://cdn.example.com/blog/p/b.png)\n\
                    ![z](https://cdn.example.com/other/c.png)";
        let urls: Vec<_> = markdown_images(text, base).map(|r| r.source).collect();
        assert_eq!(urls, ["https://cdn.example.com/other/c.png"]);
    }

    #[test]
    fn test_markdown_ignores_links_and_relative_images() {
        let text = "[not an image](https://host/a.png) ![rel](./a.png) ![abs](/a.png)";
        assert_eq!(markdown_images(text, BASE).count(), 0);
    }

    #[test]
    fn test_document_order_within_kind() {
        let text = "![one](https://h/1.png) text ![two](https://h/2.png)\n![three](https://h/3.png)";
        let alts: Vec<_> = markdown_images(text, BASE).map(|r| r.alt.unwrap()).collect();
        assert_eq!(alts, ["one", "two", "three"]);
    }

    #[test]
    fn test_repeated_span_is_yielded_each_time() {
        let text = "{% img https://h/a.png %} and {% img https://h/a.png %}";
        assert_eq!(external_tags(text).count(), 2);
    }

    #[test]
    fn test_extract_dispatch() {
        let text = "{% img https://h/a.png %}\n{% asset_img b.png %}\n![c](https://h/c.png)";
        for kind in RefKind::ALL {
            let refs: Vec<_> = extract(kind, text, BASE).collect();
            assert_eq!(refs.len(), 1, "kind {kind}");
            assert_eq!(refs[0].kind, kind);
        }
    }

    #[test]
    fn test_no_references() {
        let text = "# Title\n\nJust text with a [link](https://example.com).";
        for kind in RefKind::ALL {
            assert_eq!(extract(kind, text, BASE).count(), 0);
        }
    }
}
