//! hexo-imgkit - image tooling for Hexo blogs.
//!
//! Moves post images to Cloudflare R2 and post-processes rendered html
//! for CDN transforms and signed urls.

mod cli;
mod config;
mod core;
mod filter;
mod logger;
mod migrate;
mod store;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, MigrateArgs};
use config::{ConfigError, MigrateConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Migrate { args } => migrate(args),
        Commands::Transform { args } => cli::filter::transform_site(args),
        Commands::Sign { args } => cli::filter::sign_site(args),
    }
}

fn migrate(args: &MigrateArgs) -> Result<()> {
    let config = MigrateConfig::from_env(args).unwrap_or_else(|err| exit_on_config_error(&err));

    let stats = cli::migrate::migrate_posts(&config)?;
    if stats.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print a configuration error and exit before any I/O happens.
fn exit_on_config_error(err: &ConfigError) -> ! {
    log!("error"; "invalid configuration");
    eprintln!("{err}");
    std::process::exit(1);
}
