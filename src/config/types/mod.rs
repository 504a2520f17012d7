//! Configuration utility types.
//!
//! | Module  | Purpose                                   |
//! |---------|-------------------------------------------|
//! | `error` | Configuration error types and diagnostics |
//! | `key`   | Environment variable labels               |

mod error;
mod key;

pub use error::{ConfigDiagnostics, ConfigError};
pub use key::{EnvKey, keys};
