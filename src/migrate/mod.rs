//! Post image migration.
//!
//! # Pipeline
//!
//! ```text
//! Document ─► extract (per kind) ─► resolve key ─┬─ exists ──────────────► skipped ─┐
//!                                                └─ fetch ─► upload ─────► uploaded ─┼─► map span
//!                                                      └──── error ──────► failed    │
//! ReplacementMap ─► rewrite document (only if changed) ◄────────────────────────────┘
//! ```
//!
//! Documents are handled one at a time in path order, references one at a
//! time in document order, kind by kind.
//!
//! # Module Structure
//!
//! ```text
//! migrate/
//! ├── document.rs  # post discovery, asset folder
//! ├── extract.rs   # the three reference matchers
//! ├── fetch.rs     # local read, HTTP download with redirects
//! ├── resolve.rs   # storage key and public url
//! ├── rewrite.rs   # ReplacementMap, alt policies
//! └── report.rs    # RunStats
//! ```

pub mod document;
pub mod extract;
pub mod fetch;
pub mod report;
pub mod resolve;
pub mod rewrite;


use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

pub use document::{Document, discover};
pub use fetch::{Download, FetchError, HttpFetcher};
pub use report::{Failure, RunStats};
pub use resolve::Locator;
pub use rewrite::ReplacementMap;

use crate::core::url::parse_http;
use crate::core::{ImageRef, RefKind};
use crate::store::{Gateway, ObjectStore};
use crate::utils::mime;
use crate::{debug, log};

/// Where the bytes for one reference come from.
enum Source {
    Local(PathBuf),
    Remote(Url),
}

impl Source {
    fn describe(&self) -> String {
        match self {
            Self::Local(path) => path.display().to_string(),
            Self::Remote(url) => url.to_string(),
        }
    }
}

/// Drives one migration run over a set of documents.
pub struct Migrator<S, D> {
    gateway: Gateway<S>,
    downloader: D,
    locator: Locator,
    /// Root used to shorten document paths in logs.
    posts_dir: PathBuf,
}

impl<S: ObjectStore, D: Download> Migrator<S, D> {
    pub fn new(gateway: Gateway<S>, downloader: D, locator: Locator, posts_dir: &Path) -> Self {
        Self {
            gateway,
            downloader,
            locator,
            posts_dir: posts_dir.to_path_buf(),
        }
    }

    /// Migrate every document in order, accumulating statistics.
    ///
    /// Per-reference failures are counted and the run continues; an
    /// unreadable or unwritable document aborts it.
    pub fn run(&self, documents: &[Document]) -> Result<RunStats> {
        let mut stats = RunStats::default();
        for doc in documents {
            if self.process_document(doc, &mut stats)? {
                stats.rewritten += 1;
            }
        }
        Ok(stats)
    }

    /// Migrate one document. Returns whether its text changed.
    pub fn process_document(&self, doc: &Document, stats: &mut RunStats) -> Result<bool> {
        let name = doc.display_path(&self.posts_dir);
        log!("post"; "{name}");

        let text = fs::read_to_string(&doc.path)
            .with_context(|| format!("failed to read {}", doc.path.display()))?;

        let mut replacements = ReplacementMap::new();
        for kind in RefKind::ALL {
            let base = self.locator.public_base_url();
            for image in extract::extract(kind, &text, base) {
                if replacements.contains(image.span) {
                    continue;
                }
                if let Some(public_url) = self.migrate_reference(doc, &name, &image, stats) {
                    replacements.insert(image.span, rewrite::replacement(&image, &public_url));
                }
            }
        }

        if replacements.is_empty() {
            debug!("post"; "no images to migrate in {name}");
            return Ok(false);
        }
        let (rewritten, changed) = replacements.apply(&text);
        if !changed {
            return Ok(false);
        }

        if self.gateway.is_dry_run() {
            log!("dry-run"; "would rewrite {name} ({} replacements)", replacements.len());
        } else {
            fs::write(&doc.path, rewritten)
                .with_context(|| format!("failed to write {}", doc.path.display()))?;
            log!("done"; "rewrote {name}");
        }
        Ok(true)
    }

    /// Run one reference through resolve → (skip | fetch → upload).
    ///
    /// Returns the public url to map the span to, or `None` when the
    /// reference stays as written.
    fn migrate_reference(
        &self,
        doc: &Document,
        name: &str,
        image: &ImageRef<'_>,
        stats: &mut RunStats,
    ) -> Option<String> {
        let source = match image.kind {
            RefKind::LocalAsset => {
                let path = doc.asset_dir.join(&image.filename);
                if !path.is_file() {
                    let target = path.display().to_string();
                    fail(stats, name, image.kind, &target, &FetchError::NotFound(path));
                    return None;
                }
                Source::Local(path)
            }
            _ => match parse_http(image.source) {
                Some(url) => Source::Remote(url),
                None => {
                    debug!("skip"; "{name} {} malformed url {}", image.kind, image.source);
                    return None;
                }
            },
        };

        let location = self.locator.resolve(&doc.id, &image.filename);

        if self.gateway.exists(&location.key) {
            log!("skip"; "{} already stored", location.key);
            stats.skipped += 1;
            return Some(location.public_url);
        }

        let bytes = match &source {
            Source::Local(path) => {
                debug!("fetch"; "reading {}", path.display());
                fetch::read_local(&doc.asset_dir, &image.filename)
            }
            Source::Remote(url) => {
                debug!("fetch"; "downloading {url}");
                self.downloader.download(url)
            }
        };
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(err) => {
                fail(stats, name, image.kind, &source.describe(), &err);
                return None;
            }
        };

        let content_type = mime::from_filename(&image.filename);
        match self.gateway.upload(&location.key, &bytes, content_type) {
            Ok(public_url) => {
                log!("upload"; "{} -> {public_url}", image.source);
                stats.uploaded += 1;
                Some(public_url)
            }
            Err(err) => {
                fail(stats, name, image.kind, &source.describe(), &err);
                None
            }
        }
    }
}

/// Log and count a reference that stays unmigrated.
fn fail(
    stats: &mut RunStats,
    document: &str,
    kind: RefKind,
    target: &str,
    err: &dyn std::error::Error,
) {
    log!("fail"; "{document} {kind} {target}: {err}");
    stats.record_failure(
        document,
        Failure {
            kind,
            target: target.to_string(),
            reason: err.to_string(),
        },
    );
}
