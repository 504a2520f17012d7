//! Image references found in post sources.

use std::fmt;

use super::url::filename_from_url;

/// Syntactic kind of an image reference.
///
/// Variants are declared in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// `{% img https://host/a.png 'Caption' %}`
    ExternalTag,
    /// `{% asset_img diagram.png Caption %}`, resolved in the post's asset folder
    LocalAsset,
    /// `![alt](https://host/a.png "title")`
    MarkdownImage,
}

impl RefKind {
    /// All kinds in the order a document is processed.
    pub const ALL: [Self; 3] = [Self::ExternalTag, Self::LocalAsset, Self::MarkdownImage];

    /// Short label for log output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExternalTag => "img",
            Self::LocalAsset => "asset_img",
            Self::MarkdownImage => "markdown",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One image reference, borrowed from the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub kind: RefKind,
    /// Exact matched text, replaced verbatim on rewrite.
    pub span: &'a str,
    /// Url for remote kinds, bare filename for `LocalAsset`.
    pub source: &'a str,
    /// Filename used in the storage key.
    pub filename: String,
    /// Caption / alt text as written (empty captions are `None`).
    pub alt: Option<&'a str>,
    /// Markdown title, `MarkdownImage` only.
    pub title: Option<&'a str>,
}

impl<'a> ImageRef<'a> {
    pub fn external(span: &'a str, url: &'a str, alt: Option<&'a str>) -> Self {
        Self {
            kind: RefKind::ExternalTag,
            span,
            source: url,
            filename: filename_from_url(url),
            alt: non_empty(alt),
            title: None,
        }
    }

    pub fn local(span: &'a str, filename: &'a str, alt: Option<&'a str>) -> Self {
        Self {
            kind: RefKind::LocalAsset,
            span,
            source: filename,
            filename: filename.to_string(),
            alt: non_empty(alt),
            title: None,
        }
    }

    pub fn markdown(span: &'a str, alt: &'a str, url: &'a str, title: Option<&'a str>) -> Self {
        Self {
            kind: RefKind::MarkdownImage,
            span,
            source: url,
            filename: filename_from_url(url),
            alt: Some(alt),
            title: non_empty(title),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
