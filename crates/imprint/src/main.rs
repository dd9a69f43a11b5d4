//! Imprint CLI - watermark, publish and catalogue product images.
//!
//! Imprint resizes an image, burns a watermark into it, re-encodes it as JPEG
//! and uploads it to an object store, printing the public URL. It also wraps
//! the admin REST API for products and users.
//!
//! # Usage
//!
//! ```bash
//! # Publish one image
//! imprint publish photo.png
//!
//! # See what would happen without uploading
//! imprint publish photo.png --dry-run --json
//!
//! # Create a product with a freshly published image
//! imprint login --email admin@example.com
//! imprint products create --name Chair --price 129 --image ./chair.png
//!
//! # View configuration
//! imprint config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Imprint - watermark, publish and catalogue product images.
#[derive(Parser, Debug)]
#[command(name = "imprint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resize, watermark and upload an image, then print its public URL
    Publish(cli::publish::PublishArgs),

    /// Print the object key an upload of a file would use
    Key(cli::key::KeyArgs),

    /// Log in to the admin API
    Login(cli::auth::LoginArgs),

    /// Forget the saved session
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Manage catalog products
    Products(cli::products::ProductsArgs),

    /// Manage user accounts
    Users(cli::users::UsersArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match imprint_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `imprint config path`."
            );
            imprint_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Imprint v{}", imprint_core::VERSION);

    match cli.command {
        Commands::Publish(args) => cli::publish::execute(args, &config).await,
        Commands::Key(args) => cli::key::execute(args, &config),
        Commands::Login(args) => cli::auth::login(args, &config).await,
        Commands::Logout => cli::auth::logout(),
        Commands::Whoami => cli::auth::whoami(),
        Commands::Products(args) => cli::products::execute(args, &config).await,
        Commands::Users(args) => cli::users::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
