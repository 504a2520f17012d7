//! Object storage for migrated images.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs     # ObjectStore trait, Gateway (dry-run aware)
//! ├── r2.rs      # Cloudflare R2 over the S3 API
//! ├── sigv4.rs   # AWS Signature V4
//! └── memory.rs  # In-memory store (tests)
//! ```

#[cfg(test)]
pub mod memory;
pub mod r2;
pub mod sigv4;

pub use r2::R2Store;

use thiserror::Error;

use crate::{debug, log};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store endpoint: {0}")]
    Endpoint(String),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request for {key} failed: {source}")]
    Transport {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("store answered HTTP {status} for {key}{}", fmt_body(.body))]
    Status {
        status: u16,
        key: String,
        body: String,
    },
}

fn fmt_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body.trim())
    }
}

/// Minimal object API the migration needs.
pub trait ObjectStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError>;
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        (**self).put(key, bytes, content_type)
    }
}

/// Store front used by the migration: hides probe errors and honors dry-run.
pub struct Gateway<S> {
    store: S,
    public_base_url: String,
    dry_run: bool,
}

impl<S: ObjectStore> Gateway<S> {
    pub fn new(store: S, public_base_url: &str, dry_run: bool) -> Self {
        Self {
            store,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    /// Whether `key` is already stored.
    ///
    /// Probe failures read as "absent" so the image is uploaded again.
    /// Always `false` in dry-run, without touching the network.
    pub fn exists(&self, key: &str) -> bool {
        if self.dry_run {
            return false;
        }
        match self.store.exists(key) {
            Ok(found) => found,
            Err(err) => {
                debug!("store"; "probe failed, assuming absent: {err}");
                false
            }
        }
    }

    /// Upload `bytes` under `key` and return its public url.
    ///
    /// In dry-run nothing is sent; the intent is logged and the would-be url
    /// returned.
    pub fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        if self.dry_run {
            log!("dry-run"; "would upload {key} ({} bytes, {content_type})", bytes.len());
        } else {
            self.store.put(key, bytes, content_type)?;
        }
        Ok(self.public_url(key))
    }
}
