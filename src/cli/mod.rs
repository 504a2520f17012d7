//! Command-line interface module.

mod args;
pub mod filter;
pub mod migrate;

pub use args::{Cli, Commands, MigrateArgs, OutputArgs, SignArgs, TransformArgs};
