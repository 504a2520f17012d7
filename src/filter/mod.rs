//! Post-processing filters over rendered HTML.
//!
//! # Module Structure
//!
//! ```text
//! filter/
//! ├── mod.rs   # HtmlFilter trait, parallel directory pass
//! ├── cdn.rs   # /cdn-cgi/image/ transform
//! └── sign.rs  # HMAC-signed <img src>
//! ```
//!
//! Files are independent: each one is read, filtered and written back on
//! its own rayon task, and only when the filter changed something.

pub mod cdn;
pub mod sign;

pub use cdn::CdnTransform;
pub use sign::ImageSigner;

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use jwalk::WalkDir;
use rayon::prelude::*;

use crate::debug;
use crate::logger::ProgressLine;

/// A pure text transform over one HTML document.
pub trait HtmlFilter: Sync {
    /// Short name for log prefixes and progress counters.
    fn name(&self) -> &'static str;

    fn apply<'a>(&self, html: &'a str) -> Cow<'a, str>;
}

impl HtmlFilter for CdnTransform {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn apply<'a>(&self, html: &'a str) -> Cow<'a, str> {
        CdnTransform::apply(self, html)
    }
}

impl HtmlFilter for ImageSigner {
    fn name(&self) -> &'static str {
        "sign"
    }

    fn apply<'a>(&self, html: &'a str) -> Cow<'a, str> {
        self.sign_html(html)
    }
}

/// Outcome of one directory pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub scanned: usize,
    pub changed: usize,
}

/// Recursively collect `.html` files under `dir`, sorted by path.
pub fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("html")))
        .collect();
    files.sort();
    files
}

/// Apply `filter` to every file in parallel, writing back changed files
/// unless `dry_run`.
pub fn filter_files(
    filter: &dyn HtmlFilter,
    files: &[PathBuf],
    dry_run: bool,
    progress: Option<&ProgressLine>,
) -> Result<FilterStats> {
    let changed = AtomicUsize::new(0);

    files.par_iter().try_for_each(|path| -> Result<()> {
        if filter_file(filter, path, dry_run)? {
            changed.fetch_add(1, Ordering::Relaxed);
            if let Some(p) = progress {
                p.inc("changed");
            }
        }
        if let Some(p) = progress {
            p.inc("html");
        }
        Ok(())
    })?;

    Ok(FilterStats {
        scanned: files.len(),
        changed: changed.into_inner(),
    })
}

/// Filter one file. Returns whether its content changed.
fn filter_file(filter: &dyn HtmlFilter, path: &Path, dry_run: bool) -> Result<bool> {
    let html =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let output = filter.apply(&html);
    if output.as_ref() == html.as_str() {
        return Ok(false);
    }

    if dry_run {
        debug!(filter.name(); "would update {}", path.display());
    } else {
        fs::write(path, output.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(filter.name(); "updated {}", path.display());
    }
    Ok(true)
}
