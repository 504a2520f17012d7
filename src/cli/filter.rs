//! `transform` and `sign` commands: rewrite rendered html in place.

use anyhow::{Context, Result};

use super::{OutputArgs, SignArgs, TransformArgs};
use crate::config::{CdnTransformConfig, SignConfig};
use crate::filter::{
    CdnTransform, FilterStats, HtmlFilter, ImageSigner, collect_html_files, filter_files,
};
use crate::log;
use crate::logger::ProgressLine;
use crate::utils::plural_count;

/// Route bucket image urls through `/cdn-cgi/image/<options>/`.
pub fn transform_site(args: &TransformArgs) -> Result<()> {
    let config = CdnTransformConfig::load(&args.config)?
        .with_overrides(args.base_url.as_deref(), args.options.as_deref());

    if !config.enable {
        log!("transform"; "disabled by cf_image_transform.enable");
        return Ok(());
    }
    let Some(transform) = CdnTransform::from_config(&config).context("invalid base url")? else {
        log!("warning"; "r2_base_url is not configured, skipping transform");
        return Ok(());
    };

    log!("transform"; "{} -> {}", config.r2_base_url, transform.prefix());
    run_filter(&transform, &args.output)
}

/// Append HMAC signatures to `<img src>` urls on the configured host.
pub fn sign_site(args: &SignArgs) -> Result<()> {
    let config = SignConfig::from_env(args)?;

    let Some(secret) = config.secret else {
        log!("warning"; "IMAGE_SIGN_SECRET is not set, image signing is disabled");
        return Ok(());
    };

    let signer = ImageSigner::new(&config.domain, secret);
    log!("sign"; "signing images on {}", signer.domain());
    run_filter(&signer, &args.output)
}

fn run_filter(filter: &dyn HtmlFilter, output: &OutputArgs) -> Result<()> {
    let name = filter.name();
    if !output.public_dir.is_dir() {
        anyhow::bail!(
            "output directory not found: {} (run `hexo generate` first)",
            output.public_dir.display()
        );
    }

    let files = collect_html_files(&output.public_dir);
    if files.is_empty() {
        log!(name; "no html files in {}", output.public_dir.display());
        return Ok(());
    }

    let progress = ProgressLine::new(name, &[("html", files.len()), ("changed", files.len())]);
    let result = filter_files(filter, &files, output.dry_run, Some(&progress));
    progress.finish();
    let FilterStats { scanned, changed } = result?;

    if output.dry_run {
        log!("dry-run"; "{} of {} would change", plural_count(changed, "file"), scanned);
    } else {
        log!("done"; "updated {} of {}", plural_count(changed, "file"), scanned);
    }
    Ok(())
}
