//! Image url signing settings.
//!
//! ```text
//! IMAGE_SIGN_SECRET=...             # HMAC-SHA256 key; unset disables signing
//! IMAGE_SIGN_DOMAIN=img.example.com # hostname whose urls are signed
//! ```

use std::fmt;

use crate::config::types::{ConfigDiagnostics, ConfigError, keys};

#[derive(Clone, PartialEq, Eq)]
pub struct SignConfig {
    /// Shared secret with the edge worker that verifies signatures.
    /// `None` means signing is disabled.
    pub secret: Option<String>,
    /// Only urls on this exact hostname are signed.
    pub domain: String,
}

impl SignConfig {
    pub(crate) fn from_lookup<F>(domain: Option<&str>, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diag = ConfigDiagnostics::new();

        let domain = domain
            .map(str::to_string)
            .filter(|d| !d.is_empty())
            .or_else(|| lookup(keys::SIGN_DOMAIN.as_str()));
        let domain = match domain {
            Some(domain) => domain.trim().to_ascii_lowercase(),
            None => {
                diag.error_with_hint(
                    keys::SIGN_DOMAIN,
                    "image hostname to sign is not set",
                    "pass --domain <host> or export IMAGE_SIGN_DOMAIN=<host>",
                );
                String::new()
            }
        };

        diag.into_result()?;

        Ok(Self {
            secret: lookup(keys::SIGN_SECRET.as_str()),
            domain,
        })
    }
}

impl fmt::Debug for SignConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignConfig")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("domain", &self.domain)
            .finish()
    }
}
