//! Environment variable names used as diagnostic labels.

use owo_colors::OwoColorize;
use std::fmt;

/// Name of an environment variable that feeds a configuration value.
///
/// Diagnostics are labeled with the variable name so the user knows
/// exactly what to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvKey(pub &'static str);

impl EnvKey {
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for EnvKey {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Recognized environment variables.
pub mod keys {
    use super::EnvKey;

    pub const ACCESS_KEY_ID: EnvKey = EnvKey::new("R2_ACCESS_KEY_ID");
    pub const SECRET_ACCESS_KEY: EnvKey = EnvKey::new("R2_SECRET_ACCESS_KEY");
    pub const ACCOUNT_ID: EnvKey = EnvKey::new("R2_ACCOUNT_ID");
    pub const BUCKET: EnvKey = EnvKey::new("R2_BUCKET");
    pub const PUBLIC_BASE_URL: EnvKey = EnvKey::new("R2_PUBLIC_BASE_URL");
    pub const KEY_PREFIX: EnvKey = EnvKey::new("R2_KEY_PREFIX");
    pub const ENDPOINT: EnvKey = EnvKey::new("R2_ENDPOINT");
    pub const POSTS_DIR: EnvKey = EnvKey::new("POSTS_DIR");

    /// Proxy variables, in lookup priority order.
    pub const PROXY: [EnvKey; 3] = [
        EnvKey::new("HTTPS_PROXY"),
        EnvKey::new("HTTP_PROXY"),
        EnvKey::new("ALL_PROXY"),
    ];

    pub const SIGN_SECRET: EnvKey = EnvKey::new("IMAGE_SIGN_SECRET");
    pub const SIGN_DOMAIN: EnvKey = EnvKey::new("IMAGE_SIGN_DOMAIN");
}
