//! The `imprint publish` command.

use anyhow::Context;
use clap::Args;
use imprint_core::storage::MemoryStore;
use imprint_core::{
    Config, ImagePublisher, ObjectStore, PublishOptions, SourceImage, StoreFactory,
};
use std::path::PathBuf;
use std::sync::Arc;

use super::expand_path;

/// Arguments for the `publish` command.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Image file to publish
    pub file: PathBuf,

    /// Bucket to write to (defaults to [storage] bucket)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Key prefix (defaults to [storage] key_prefix)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Run the pipeline against an in-memory store; nothing is uploaded
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full publish report as JSON instead of just the URL
    #[arg(long)]
    pub json: bool,
}

/// Execute the publish command.
pub async fn execute(args: PublishArgs, config: &Config) -> anyhow::Result<()> {
    let path = expand_path(&args.file);
    let source = SourceImage::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let store: Arc<dyn ObjectStore> = if args.dry_run {
        Arc::new(MemoryStore::default())
    } else {
        StoreFactory::create(config)?
    };

    let options = PublishOptions {
        bucket: args.bucket,
        prefix: args.prefix,
    };
    let publisher = ImagePublisher::with_options(config, store, options)?;
    tracing::debug!("Publishing {} via {} store", path.display(), publisher.store_name());

    let published = publisher
        .publish(source)
        .await
        .map_err(|e| anyhow::anyhow!("{} stage failed: {}", e.stage(), e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&published)?);
    } else {
        println!("{}", published.url);
    }

    if args.dry_run {
        tracing::info!("Dry run: {} was not uploaded", published.path);
    }

    Ok(())
}
