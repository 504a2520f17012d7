//! Object store (Cloudflare R2) credentials and addressing.
//!
//! # Environment
//!
//! ```text
//! R2_ACCESS_KEY_ID=...          # access key
//! R2_SECRET_ACCESS_KEY=...      # secret key
//! R2_ACCOUNT_ID=...             # account id, selects the endpoint host
//! R2_BUCKET=blog-images         # bucket name
//! R2_ENDPOINT=https://...       # optional: any S3-compatible endpoint
//! ```

use std::fmt;

use crate::config::types::{ConfigDiagnostics, EnvKey, keys};

/// Signing region R2 expects.
pub const R2_REGION: &str = "auto";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub account_id: String,
    pub bucket: String,
    /// Overrides the endpoint derived from `account_id`.
    pub endpoint: Option<String>,
}

impl StoreConfig {
    /// Read store settings through `lookup`, recording missing values.
    pub(crate) fn from_lookup<F>(lookup: &F, diag: &mut ConfigDiagnostics) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut required = |key: EnvKey| {
            let value = lookup(key.as_str());
            if value.is_none() {
                diag.missing(key);
            }
            value.unwrap_or_default()
        };

        let access_key_id = required(keys::ACCESS_KEY_ID);
        let secret_access_key = required(keys::SECRET_ACCESS_KEY);
        let account_id = required(keys::ACCOUNT_ID);
        let bucket = required(keys::BUCKET);

        let endpoint = lookup(keys::ENDPOINT.as_str()).map(|e| e.trim_end_matches('/').to_string());
        if let Some(endpoint) = &endpoint
            && url::Url::parse(endpoint).is_err()
        {
            diag.error(keys::ENDPOINT, format!("not a valid url: {endpoint}"));
        }

        Self {
            access_key_id,
            secret_access_key,
            account_id,
            bucket,
            endpoint,
        }
    }

    /// Endpoint base url without trailing slash.
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.r2.cloudflarestorage.com", self.account_id),
        }
    }
}

// Keep the secret out of debug output.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("account_id", &self.account_id)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
