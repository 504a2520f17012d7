//! `migrate` command.

use anyhow::{Context, Result};

use crate::config::MigrateConfig;
use crate::log;
use crate::migrate::{HttpFetcher, Locator, Migrator, RunStats, discover};
use crate::store::{Gateway, R2Store};
use crate::utils::plural_count;

/// Upload post images and rewrite references, returning the run statistics.
pub fn migrate_posts(config: &MigrateConfig) -> Result<RunStats> {
    print_settings(config);

    let documents = discover(&config.posts_dir);
    if documents.is_empty() {
        log!("migrate"; "no posts found in {}", config.posts_dir.display());
        return Ok(RunStats::default());
    }
    log!("migrate"; "scanning {}", plural_count(documents.len(), "post"));

    let store = R2Store::new(config.store.clone()).context("failed to set up object store")?;
    let fetcher =
        HttpFetcher::new(config.proxy.as_deref()).context("failed to set up http client")?;

    let migrator = Migrator::new(
        Gateway::new(store, &config.public_base_url, config.dry_run),
        fetcher,
        Locator::from_config(config),
        &config.posts_dir,
    );
    let stats = migrator.run(&documents)?;

    stats.print_failures();
    log!("done"; "{stats}");
    if config.dry_run {
        log!("dry-run"; "no objects uploaded, no posts written");
    }
    Ok(stats)
}

fn print_settings(config: &MigrateConfig) {
    if config.dry_run {
        log!("dry-run"; "scan only: uploads and writes are skipped");
    }
    log!("migrate"; "bucket    {} @ {}", config.store.bucket, config.store.endpoint_url());
    log!("migrate"; "public    {}", config.public_base_url);
    log!("migrate"; "prefix    {}", config.key_prefix);
    log!("migrate"; "posts     {}", config.posts_dir.display());
    if let Some(proxy) = &config.proxy {
        log!("migrate"; "proxy     {proxy}");
    }
}
