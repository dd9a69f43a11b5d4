//! Command implementations for the `imprint` binary.

pub mod auth;
pub mod config;
pub mod key;
pub mod products;
pub mod publish;
pub mod theme;
pub mod users;

use anyhow::Context;
use imprint_core::{ApiClient, Config, Session, SessionStore};
use std::path::PathBuf;

/// Expand `~` in a path argument.
pub(crate) fn expand_path(path: &std::path::Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Build the API client, pointing at the config when it is missing.
pub(crate) fn api_client(config: &Config) -> anyhow::Result<ApiClient> {
    ApiClient::from_config(config)
        .context("Admin API is not configured (see `imprint config path`)")
}

/// Load the saved session or explain how to get one.
pub(crate) fn require_session() -> anyhow::Result<Session> {
    SessionStore::open_default()
        .load()?
        .context("Not logged in. Run `imprint login --email <EMAIL>` first.")
}
