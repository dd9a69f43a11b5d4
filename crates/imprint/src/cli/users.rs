//! The `imprint users` command.

use clap::{Args, Subcommand};
use imprint_core::api::{NewUser, User};
use imprint_core::{Config, Role};

use super::theme::{confirm, success};
use super::{api_client, require_session};

/// Arguments for the `users` command.
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

/// Subcommands for user management.
#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List users
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Register a user (admin only)
    Create {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "IMPRINT_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// admin or customer
        #[arg(long, default_value = "customer")]
        role: Role,
    },

    /// Delete a user (admin only)
    Delete {
        /// User id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute the users command.
pub async fn execute(args: UsersArgs, config: &Config) -> anyhow::Result<()> {
    let client = api_client(config)?;
    let session = require_session()?;

    match args.command {
        UsersCommand::List { json } => {
            let users = client.list_users(&session).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else {
                print_table(&users);
            }
        }

        UsersCommand::Create {
            first_name,
            last_name,
            email,
            password,
            role,
        } => {
            let new_user = NewUser {
                first_name,
                last_name,
                email,
                password,
                role,
            };
            let user = client.create_user(&session, &new_user).await?;
            success(format!("Created {} ({}) as {}", user.email, user.id, user.role));
            println!("{}", user.id);
        }

        UsersCommand::Delete { id, yes } => {
            session.require_admin()?;
            if !confirm(&format!("Delete user {id}?"), yes)? {
                return Ok(());
            }
            client.delete_user(&session, &id).await?;
            success(format!("Deleted user {id}"));
        }
    }

    Ok(())
}

fn print_table(users: &[User]) {
    if users.is_empty() {
        eprintln!("No users");
        return;
    }
    for user in users {
        println!(
            "{:<38} {:<32} {:<24} {}",
            user.id,
            user.email,
            user.full_name(),
            user.role
        );
    }
}
