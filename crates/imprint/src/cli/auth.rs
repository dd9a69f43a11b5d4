//! The `imprint login`, `logout` and `whoami` commands.

use clap::Args;
use dialoguer::Password;
use imprint_core::api::Credentials;
use imprint_core::{Config, SessionStore};

use super::theme::{dim, imprint_theme, success};
use super::{api_client, require_session};

/// Arguments for the `login` command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, env = "IMPRINT_EMAIL")]
    pub email: String,

    /// Account password (prompted for when omitted)
    #[arg(long, env = "IMPRINT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Log in and save the session.
pub async fn login(args: LoginArgs, config: &Config) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => Password::with_theme(&imprint_theme())
            .with_prompt(format!("Password for {}", args.email))
            .interact()?,
    };

    let client = api_client(config)?;
    let session = client
        .login(&Credentials {
            email: args.email,
            password,
        })
        .await?;

    let store = SessionStore::open_default();
    store.save(&session)?;

    success(format!("Logged in as {} ({})", session.email, session.role));
    eprintln!(
        "  {}",
        dim().apply_to(format!("Session saved to {}", store.path().display()))
    );
    Ok(())
}

/// Remove the saved session.
pub fn logout() -> anyhow::Result<()> {
    if SessionStore::open_default().clear()? {
        success("Logged out");
    } else {
        eprintln!("Not logged in");
    }
    Ok(())
}

/// Show who the saved session belongs to.
pub fn whoami() -> anyhow::Result<()> {
    let session = require_session()?;
    println!("{}", session.email);
    eprintln!(
        "  {}",
        dim().apply_to(format!("{} · user {}", session.role, session.user_id))
    );
    Ok(())
}
