//! # webotron CLI interface
//!
//! Command parsing, argument validation and the async entrypoint. Each subcommand maps to
//! exactly one [`BucketManager`] operation, except `setup-bucket`, which runs create, policy
//! and website in that order and stops at the first failure.
//!
//! Bucket logic lives in `webotron-core`; this module only wires it up and prints results.
//! [`run`] builds the S3-backed manager; [`execute`] takes any [`ObjectStore`] and any writer,
//! which is what the tests use.

use crate::load_config::Settings;
use crate::s3::connect;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use webotron_core::synchronise::expand_home;
use webotron_core::{BucketManager, CreateBucketOutcome, ObjectStore};

/// Webotron deploys websites to AWS.
#[derive(Debug, Parser)]
#[clap(
    name = "webotron",
    version,
    about = "Deploy a local directory as a static website to an S3 bucket"
)]
pub struct Cli {
    #[clap(flatten)]
    pub global: GlobalArgs,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Default, Clone, Args)]
pub struct GlobalArgs {
    /// Named credential profile
    #[clap(long, env = "WEBOTRON_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Region for the session and for new buckets
    #[clap(long, env = "WEBOTRON_REGION", global = true)]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint (path-style addressing)
    #[clap(long, env = "WEBOTRON_ENDPOINT_URL", global = true)]
    pub endpoint_url: Option<String>,

    /// YAML file with profile, region and endpoint_url defaults
    #[clap(long, env = "WEBOTRON_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all S3 buckets
    ListBuckets,
    /// List objects in an S3 bucket
    ListBucketObjects { bucket: String },
    /// Create and configure an S3 bucket for static website hosting
    SetupBucket { bucket: String },
    /// Sync contents of PATHNAME to BUCKET
    Sync {
        #[clap(value_parser = existing_path)]
        pathname: PathBuf,
        bucket: String,
    },
}

fn existing_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if expand_home(&path).exists() {
        Ok(path)
    } else {
        Err(format!("path '{raw}' does not exist"))
    }
}

/// Async CLI entrypoint used by main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let settings = Settings::resolve(&cli.global)?;
    let manager = connect(&settings).await;
    let mut stdout = std::io::stdout();
    execute(cli.command, &manager, &mut stdout).await
}

/// Run one command against `manager`, writing user-facing lines to `out`.
pub async fn execute<S, W>(command: Commands, manager: &BucketManager<S>, out: &mut W) -> Result<()>
where
    S: ObjectStore,
    W: Write,
{
    match command {
        Commands::ListBuckets => {
            tracing::info!(command = "list-buckets", "Listing buckets");
            for bucket in manager.all_buckets().await? {
                writeln!(out, "{bucket}")?;
            }
        }
        Commands::ListBucketObjects { bucket } => {
            tracing::info!(command = "list-bucket-objects", %bucket, "Listing objects");
            let keys = manager.all_objects(&bucket).await?;
            if keys.is_empty() {
                writeln!(out, "No objects found in {bucket}")?;
            }
            for key in keys {
                writeln!(out, "{key}")?;
            }
        }
        Commands::SetupBucket { bucket } => {
            tracing::info!(command = "setup-bucket", %bucket, "Setting up bucket");
            let handle = manager.ensure_bucket(&bucket).await?;
            if handle.outcome == CreateBucketOutcome::AlreadyOwned {
                writeln!(out, "{} is already owned by you.", handle.name)?;
            }
            manager.set_public_read_policy(&handle.name).await?;
            manager.configure_website(&handle.name).await?;
            writeln!(
                out,
                "Bucket {} is configured for static website hosting",
                handle.name
            )?;
        }
        Commands::Sync { pathname, bucket } => {
            tracing::info!(command = "sync", path = %pathname.display(), %bucket, "Starting sync");
            let report = manager.sync(Path::new(&pathname), &bucket).await?;
            tracing::info!(command = "sync", files = report.uploaded.len(), "Sync finished");
            writeln!(out, "Successfully synced {} to {bucket}", pathname.display())?;
        }
    }
    Ok(())
}
