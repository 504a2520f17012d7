//! Run configuration, sourced from the environment and CLI flags.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── store      # R2 credentials and endpoint
//! │   ├── transform  # `cf_image_transform` from _config.yml
//! │   └── sign       # image url signing
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── key        # EnvKey labels
//! └── mod.rs         # MigrateConfig (this file)
//! ```
//!
//! Everything is read once at process start into plain structs and passed
//! down explicitly; nothing reads the environment after that.

pub mod section;
pub mod types;

pub use section::{CdnTransformConfig, SignConfig, StoreConfig};
pub use types::{ConfigDiagnostics, ConfigError, keys};

use std::path::{Path, PathBuf};

use crate::cli::{MigrateArgs, SignArgs};

/// Default storage key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "blog/";

/// Default posts directory, relative to the working directory.
pub const DEFAULT_POSTS_DIR: &str = "source/_posts";

// ============================================================================
// migrate configuration
// ============================================================================

/// Settings for one `migrate` run.
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// Object store credentials
    pub store: StoreConfig,

    /// Public url prefix the bucket is served under (no trailing slash)
    pub public_base_url: String,

    /// Prefix prepended to every storage key
    pub key_prefix: String,

    /// Root directory scanned for `.md` posts
    pub posts_dir: PathBuf,

    /// Forward proxy for image downloads
    pub proxy: Option<String>,

    /// Skip uploads and writes, report only
    pub dry_run: bool,
}

impl MigrateConfig {
    /// Build from the process environment.
    pub fn from_env(args: &MigrateArgs) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|err| ConfigError::Io(PathBuf::from("."), err))?;
        Self::from_lookup(args, &cwd, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. All missing or malformed values are
    /// reported together.
    pub fn from_lookup<F>(args: &MigrateArgs, cwd: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = non_empty(lookup);
        let mut diag = ConfigDiagnostics::new();

        let store = StoreConfig::from_lookup(&lookup, &mut diag);

        let public_base_url = match lookup(keys::PUBLIC_BASE_URL.as_str()) {
            Some(raw) => {
                let trimmed = raw.trim_end_matches('/').to_string();
                if !is_http_url(&trimmed) {
                    diag.error_with_hint(
                        keys::PUBLIC_BASE_URL,
                        format!("not a valid http(s) url: {raw}"),
                        "e.g. https://images.example.com",
                    );
                }
                trimmed
            }
            None => {
                diag.missing(keys::PUBLIC_BASE_URL);
                String::new()
            }
        };

        let key_prefix =
            lookup(keys::KEY_PREFIX.as_str()).unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());

        let proxy = keys::PROXY
            .iter()
            .find_map(|&key| lookup(key.as_str()).map(|value| (key, value)));
        if let Some((key, value)) = &proxy
            && !is_http_url(value)
        {
            diag.error_with_hint(
                *key,
                format!("proxy must be an http(s) url: {value}"),
                "e.g. http://127.0.0.1:7890",
            );
        }
        let proxy = proxy.map(|(_, value)| value);

        let posts_dir = match (&args.posts_dir, lookup(keys::POSTS_DIR.as_str())) {
            (Some(dir), _) => cwd.join(dir),
            (None, Some(dir)) => cwd.join(shellexpand::tilde(&dir).into_owned()),
            (None, None) => cwd.join(DEFAULT_POSTS_DIR),
        };

        diag.into_result()?;

        Ok(Self {
            store,
            public_base_url,
            key_prefix,
            posts_dir,
            proxy,
            dry_run: args.dry_run,
        })
    }
}

// ============================================================================
// sign configuration
// ============================================================================

impl SignConfig {
    /// Build from CLI flags and the process environment.
    pub fn from_env(args: &SignArgs) -> Result<Self, ConfigError> {
        let lookup = non_empty(|key: &str| std::env::var(key).ok());
        Self::from_lookup(args.domain.as_deref(), &lookup)
    }
}

// ============================================================================
// helpers
// ============================================================================

/// Wrap a lookup so that empty values read as unset.
fn non_empty<F>(lookup: F) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key: &str| lookup(key).filter(|v| !v.trim().is_empty())
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    const REQUIRED: [(&str, &str); 5] = [
        ("R2_ACCESS_KEY_ID", "AKID"),
        ("R2_SECRET_ACCESS_KEY", "SECRET"),
        ("R2_ACCOUNT_ID", "acct"),
        ("R2_BUCKET", "blog"),
        ("R2_PUBLIC_BASE_URL", "https://img.example.com/"),
    ];

    fn env(extra: &[(&str, &str)], without: &[&str]) -> FxHashMap<String, String> {
        REQUIRED
            .iter()
            .chain(extra.iter())
            .filter(|(k, _)| !without.contains(k))
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn load(
        args: &MigrateArgs,
        vars: &FxHashMap<String, String>,
    ) -> Result<MigrateConfig, ConfigError> {
        MigrateConfig::from_lookup(args, Path::new("/site"), |k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&MigrateArgs::default(), &env(&[], &[])).unwrap();
        assert_eq!(config.public_base_url, "https://img.example.com");
        assert_eq!(config.key_prefix, "blog/");
        assert_eq!(config.posts_dir, PathBuf::from("/site/source/_posts"));
        assert_eq!(config.store.bucket, "blog");
        assert!(config.proxy.is_none());
        assert!(!config.dry_run);
    }

    #[test]
    fn test_missing_required_are_all_listed() {
        let vars = env(&[], &["R2_BUCKET", "R2_PUBLIC_BASE_URL"]);
        let err = load(&MigrateArgs::default(), &vars).unwrap_err();
        match err {
            ConfigError::Diagnostics(diag) => {
                assert_eq!(diag.keys(), vec!["R2_BUCKET", "R2_PUBLIC_BASE_URL"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut vars = env(&[], &[]);
        vars.insert("R2_ACCOUNT_ID".into(), "  ".into());
        let err = load(&MigrateArgs::default(), &vars).unwrap_err();
        assert!(matches!(err, ConfigError::Diagnostics(d) if d.keys() == vec!["R2_ACCOUNT_ID"]));
    }

    #[test]
    fn test_invalid_public_base_url() {
        let mut vars = env(&[], &[]);
        vars.insert("R2_PUBLIC_BASE_URL".into(), "images.example.com".into());
        let err = load(&MigrateArgs::default(), &vars).unwrap_err();
        assert!(
            matches!(err, ConfigError::Diagnostics(d) if d.keys() == vec!["R2_PUBLIC_BASE_URL"])
        );
    }

    #[test]
    fn test_posts_dir_precedence() {
        let vars = env(&[("POSTS_DIR", "content/posts")], &[]);
        let config = load(&MigrateArgs::default(), &vars).unwrap();
        assert_eq!(config.posts_dir, PathBuf::from("/site/content/posts"));

        let args = MigrateArgs {
            dry_run: true,
            posts_dir: Some(PathBuf::from("/elsewhere/_posts")),
        };
        let config = load(&args, &vars).unwrap();
        assert_eq!(config.posts_dir, PathBuf::from("/elsewhere/_posts"));
        assert!(config.dry_run);
    }

    #[test]
    fn test_proxy_priority_and_prefix() {
        let vars = env(
            &[
                ("HTTP_PROXY", "http://127.0.0.1:8080"),
                ("ALL_PROXY", "http://127.0.0.1:3128"),
                ("R2_KEY_PREFIX", "img/"),
            ],
            &[],
        );
        let config = load(&MigrateArgs::default(), &vars).unwrap();
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.key_prefix, "img/");
    }

    #[test]
    fn test_non_http_proxy_rejected() {
        let vars = env(&[("ALL_PROXY", "socks5://127.0.0.1:1080")], &[]);
        let err = load(&MigrateArgs::default(), &vars).unwrap_err();
        assert!(matches!(err, ConfigError::Diagnostics(d) if d.keys() == vec!["ALL_PROXY"]));

        let vars = env(&[("HTTPS_PROXY", "not a url")], &[]);
        let err = load(&MigrateArgs::default(), &vars).unwrap_err();
        assert!(matches!(err, ConfigError::Diagnostics(d) if d.keys() == vec!["HTTPS_PROXY"]));
    }
}
