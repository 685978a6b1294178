use authgate_core::StoreBackend;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "authgate", version, about = "Sign in to an auth API and manage the session")]
pub struct Cli {
    /// API base URL (overrides config and AUTHGATE_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Token store backend: file, keyring or memory
    #[arg(long, global = true)]
    pub store: Option<StoreBackend>,

    /// Log session activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new account
    Signup { username: String, email: String },

    /// Sign in and store the session tokens
    Signin {
        /// Defaults to the last email used
        email: Option<String>,
    },

    /// Show the signed-in user's profile
    Profile {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Confirm an email address with a verification token
    Verify { token: String },

    /// End the session and clear stored tokens
    Logout,

    /// Show whether a session is stored
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_store_flag() {
        let cli = Cli::try_parse_from(["authgate", "status", "--store", "memory"]).unwrap();
        assert_eq!(cli.store, Some(StoreBackend::Memory));
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn test_parse_signin_without_email() {
        let cli = Cli::try_parse_from(["authgate", "signin"]).unwrap();
        assert!(matches!(cli.command, Command::Signin { email: None }));
    }
}
