//! CLI module for the user administration service
//!
//! Subcommands:
//! - `serve`: run the API server
//! - `dashboard`, `users`, `logout`: drive the admin views against a running API

pub mod admin;
pub mod serve;

use clap::{Args, Parser, Subcommand};

/// User administration API and admin client
#[derive(Parser)]
#[command(name = "user-admin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings for the client commands
#[derive(Args, Clone, Debug)]
pub struct ClientArgs {
    /// Base URL of the running API
    #[arg(long, global = true, env = "USER_ADMIN_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Bearer token for authenticated calls
    #[arg(long, global = true, env = "USER_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Render the admin dashboard
    Dashboard,

    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),

    /// Revoke the current token
    Logout,
}

#[derive(Subcommand, Clone, Debug)]
pub enum UsersCommand {
    /// List one page of users
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Edit a user listed on the given page
    Edit {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Delete a user listed on the given page
    Delete {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edit() {
        let cli = Cli::try_parse_from([
            "user-admin",
            "--token",
            "tok",
            "users",
            "edit",
            "7",
            "--email",
            "new@example.com",
        ])
        .unwrap();

        assert_eq!(cli.client.token.as_deref(), Some("tok"));
        match cli.command {
            Command::Users(UsersCommand::Edit {
                id, email, name, page, ..
            }) => {
                assert_eq!(id, 7);
                assert_eq!(email.as_deref(), Some("new@example.com"));
                assert!(name.is_none());
                assert_eq!(page, 1);
            }
            _ => panic!("expected users edit"),
        }
    }

    #[test]
    fn test_global_api_url_after_subcommand() {
        let cli = Cli::try_parse_from([
            "user-admin",
            "dashboard",
            "--api-url",
            "http://api.internal:9000",
        ])
        .unwrap();

        assert_eq!(cli.client.api_url, "http://api.internal:9000");
        assert!(matches!(cli.command, Command::Dashboard));
    }

    #[test]
    fn test_delete_requires_id() {
        assert!(Cli::try_parse_from(["user-admin", "users", "delete"]).is_err());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
