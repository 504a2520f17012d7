//! Configuration error types.

use super::EnvKey;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse `{0}`")]
    Yaml(PathBuf, #[source] serde_yaml::Error),

    // NOTE: No #[from] here - we don't want source() which causes duplicate output
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

// ============================================================================
// ConfigDiagnostic
// ============================================================================

/// A single configuration diagnostic
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    /// Environment variable (or flag) the value comes from
    pub key: EnvKey,
    /// Error description
    pub message: String,
    /// Fix hint (optional)
    pub hint: Option<String>,
}

impl ConfigDiagnostic {
    pub fn new(key: EnvKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}{}{}",
            "[".dimmed(),
            self.key.as_str().cyan(),
            "]".dimmed()
        )?;
        write!(f, "{} {}", "→".red(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  {} {}", "hint:".yellow(), hint)?;
        }
        Ok(())
    }
}

// ============================================================================
// ConfigDiagnostics
// ============================================================================

#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, key: EnvKey, message: impl Into<String>) {
        self.errors.push(ConfigDiagnostic::new(key, message));
    }

    /// Add an error with a hint.
    pub fn error_with_hint(
        &mut self,
        key: EnvKey,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.errors.push(ConfigDiagnostic::new(key, message).with_hint(hint));
    }

    /// Record a required variable that is unset or empty.
    pub fn missing(&mut self, key: EnvKey) {
        self.error_with_hint(
            key,
            "required but not set",
            format!("export {}=<value>", key.as_str()),
        );
    }

    /// Variable names that produced a diagnostic, in insertion order.
    #[cfg(test)]
    pub fn keys(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.key.as_str()).collect()
    }

    /// Number of recorded diagnostics.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Convert to Result (returns Err if there are errors).
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Diagnostics(self))
        }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n", "config validation failed:".red().bold())?;
        for (i, err) in self.errors.iter().enumerate() {
            write!(f, "{err}")?;
            if i + 1 < self.errors.len() {
                writeln!(f, "\n")?;
            }
        }
        if self.errors.len() > 1 {
            write!(
                f,
                "\n\n{} {} {}",
                "found".dimmed(),
                self.errors.len().to_string().red().bold(),
                "errors".dimmed()
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::keys;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("_config.yml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("_config.yml"));
    }

    #[test]
    fn test_diagnostics_list_missing_keys() {
        let mut diag = ConfigDiagnostics::new();
        diag.missing(keys::BUCKET);
        diag.missing(keys::PUBLIC_BASE_URL);

        assert_eq!(diag.keys(), vec!["R2_BUCKET", "R2_PUBLIC_BASE_URL"]);

        let display = format!("{diag}");
        assert!(display.contains("R2_BUCKET"));
        assert!(display.contains("R2_PUBLIC_BASE_URL"));
        assert!(display.contains("export R2_BUCKET=<value>"));
    }

    #[test]
    fn test_diagnostics_into_result() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());

        let mut diag = ConfigDiagnostics::new();
        diag.error(keys::PROXY[0], "not a valid url");
        assert!(matches!(
            diag.into_result(),
            Err(ConfigError::Diagnostics(d)) if d.len() == 1
        ));
    }
}
