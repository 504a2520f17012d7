//! `cf_image_transform` section of Hexo's `_config.yml`.
//!
//! # Example
//!
//! ```yaml
//! cf_image_transform:
//!   enable: true
//!   r2_base_url: "https://images.example.com"
//!   transform_options: "format=auto,quality=85,metadata=none"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::ConfigError;

/// Default Cloudflare image transformation options.
pub const DEFAULT_TRANSFORM_OPTIONS: &str = "format=auto,quality=85,metadata=none";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CdnTransformConfig {
    /// Disable the transform without removing the section.
    pub enable: bool,
    /// Public base url of the image bucket. Empty disables the transform.
    pub r2_base_url: String,
    /// Comma separated options placed in `/cdn-cgi/image/<options>/`.
    pub transform_options: String,
}

impl Default for CdnTransformConfig {
    fn default() -> Self {
        Self {
            enable: true,
            r2_base_url: String::new(),
            transform_options: DEFAULT_TRANSFORM_OPTIONS.to_string(),
        }
    }
}

/// The subset of `_config.yml` this tool reads.
#[derive(Debug, Default, Deserialize)]
struct HexoSiteConfig {
    #[serde(default)]
    cf_image_transform: Option<CdnTransformConfig>,
}

impl CdnTransformConfig {
    /// Load the section from a Hexo site config.
    ///
    /// A missing file or missing section yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_yaml(&content).map_err(|err| ConfigError::Yaml(path.to_path_buf(), err))
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let site: HexoSiteConfig = serde_yaml::from_str(content)?;
        Ok(site.cf_image_transform.unwrap_or_default())
    }

    /// Apply CLI overrides.
    pub fn with_overrides(mut self, base_url: Option<&str>, options: Option<&str>) -> Self {
        if let Some(base_url) = base_url {
            self.r2_base_url = base_url.to_string();
        }
        if let Some(options) = options {
            self.transform_options = options.to_string();
        }
        self
    }
}
