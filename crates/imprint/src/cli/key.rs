//! The `imprint key` command.

use clap::Args;
use imprint_core::pipeline::{now_millis, object_key};
use imprint_core::Config;
use std::path::Path;

/// Arguments for the `key` command.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// File name the key is derived from
    pub file_name: String,

    /// Unix time in milliseconds (defaults to now)
    #[arg(long)]
    pub timestamp: Option<u128>,

    /// Key prefix (defaults to [storage] key_prefix)
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Print the object key a publish would use.
pub fn execute(args: KeyArgs, config: &Config) -> anyhow::Result<()> {
    println!("{}", render(&args, config));
    Ok(())
}

fn render(args: &KeyArgs, config: &Config) -> String {
    let name = Path::new(&args.file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&args.file_name);
    let prefix = args
        .prefix
        .as_deref()
        .unwrap_or(&config.storage.key_prefix);
    object_key(prefix, args.timestamp.unwrap_or_else(now_millis), name)
}
