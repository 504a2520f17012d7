//! Post discovery.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;

/// A Markdown post plus the Hexo asset folder next to it.
///
/// `source/_posts/hello.md` has id `hello` and assets in `source/_posts/hello/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub id: String,
    pub asset_dir: PathBuf,
}

impl Document {
    pub fn new(path: PathBuf) -> Self {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let asset_dir = path.with_file_name(&id);
        Self {
            path,
            id,
            asset_dir,
        }
    }

    /// Path relative to `root` for display.
    pub fn display_path(&self, root: &Path) -> String {
        self.path
            .strip_prefix(root)
            .unwrap_or(&self.path)
            .display()
            .to_string()
    }
}

/// Recursively collect `.md` files under `posts_dir`, sorted by path.
///
/// Hidden files and directories are included. A missing directory yields
/// no documents.
pub fn discover(posts_dir: &Path) -> Vec<Document> {
    if !posts_dir.is_dir() {
        return Vec::new();
    }

    let mut paths: Vec<_> = WalkDir::new(posts_dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    paths.into_iter().map(Document::new).collect()
}
