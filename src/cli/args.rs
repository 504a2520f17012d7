//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Image tooling for Hexo blogs
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Upload images referenced by posts to R2 and rewrite the references
    #[command(visible_alias = "m")]
    Migrate {
        #[command(flatten)]
        args: MigrateArgs,
    },

    /// Route rendered image urls through the Cloudflare image transformation path
    #[command(visible_alias = "t")]
    Transform {
        #[command(flatten)]
        args: TransformArgs,
    },

    /// Append HMAC signatures to rendered `<img src>` urls
    #[command(visible_alias = "s")]
    Sign {
        #[command(flatten)]
        args: SignArgs,
    },
}

/// Migrate command arguments.
///
/// Credentials and bucket settings come from the environment
/// (`R2_ACCESS_KEY_ID`, `R2_SECRET_ACCESS_KEY`, `R2_ACCOUNT_ID`, `R2_BUCKET`,
/// `R2_PUBLIC_BASE_URL`).
#[derive(clap::Args, Debug, Clone, Default)]
pub struct MigrateArgs {
    /// Scan and report only: no uploads, no file writes
    #[arg(long)]
    pub dry_run: bool,

    /// Posts directory (default: $POSTS_DIR or ./source/_posts)
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub posts_dir: Option<PathBuf>,
}

/// Transform command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct TransformArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Hexo site config holding the `cf_image_transform` section
    #[arg(short = 'C', long, default_value = "_config.yml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Public base url of the image bucket (overrides `r2_base_url`)
    #[arg(short = 'U', long, value_hint = clap::ValueHint::Url)]
    pub base_url: Option<String>,

    /// Transformation options, e.g. `format=auto,quality=85` (overrides `transform_options`)
    #[arg(short = 'O', long)]
    pub options: Option<String>,
}

/// Sign command arguments.
///
/// The HMAC secret is read from `IMAGE_SIGN_SECRET`.
#[derive(clap::Args, Debug, Clone)]
pub struct SignArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Hostname whose image urls get signed (default: $IMAGE_SIGN_DOMAIN)
    #[arg(short, long)]
    pub domain: Option<String>,
}

/// Shared arguments for the html post-processing commands
#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// Rendered site directory
    #[arg(short, long, default_value = "public", value_hint = clap::ValueHint::DirPath)]
    pub public_dir: PathBuf,

    /// Report changes without writing files
    #[arg(long)]
    pub dry_run: bool,
}
