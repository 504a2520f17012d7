//! Storage locations for migrated images.
//!
//! ```text
//! key        = <key_prefix><document_id>/<filename>
//! public_url = <public_base_url>/<key>
//! ```

use crate::config::MigrateConfig;

/// Where one image lives in the bucket and on the public side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub key: String,
    pub public_url: String,
}

/// Maps `(document_id, filename)` to a [`Location`]. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct Locator {
    key_prefix: String,
    public_base_url: String,
}

impl Locator {
    pub fn new(key_prefix: impl Into<String>, public_base_url: &str) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MigrateConfig) -> Self {
        Self::new(config.key_prefix.clone(), &config.public_base_url)
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn resolve(&self, document_id: &str, filename: &str) -> Location {
        let key = format!("{}{document_id}/{filename}", self.key_prefix);
        let public_url = format!("{}/{key}", self.public_base_url);
        Location { key, public_url }
    }
}
