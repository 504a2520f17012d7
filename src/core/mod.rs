//! Core types - pure abstractions shared across the codebase.

mod reference;
pub mod url;

pub use reference::{ImageRef, RefKind};
