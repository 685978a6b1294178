//! authgate - command-line client for a token-based auth API.
//!
//! Signs in, keeps the session tokens in the configured store, and lets
//! you inspect the profile or end the session from the terminal.

mod cli;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use authgate_core::{
    user_message, Config, Loadable, LogoutAction, ProfileLoader, SessionError, SessionState,
};

use cli::{Cli, Command};

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: bool) {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let default_level = if verbose { "authgate_core=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().context("Failed to load config")?;
    if let Some(ref base_url) = cli.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(store) = cli.store {
        config.store = store;
    }

    let manager = Arc::new(config.session_manager()?);
    info!(base_url = %manager.api().base_url(), store = ?config.store, "authgate starting");

    match cli.command {
        Command::Signup { username, email } => {
            let password = prompt_password("Password: ")?;
            let confirm = prompt_password("Confirm password: ")?;
            if password != confirm {
                anyhow::bail!("Passwords do not match");
            }

            let ack = manager
                .sign_up(&username, &email, &password)
                .await
                .map_err(display_error)?;
            println!("Account created for {}.", username);
            if !ack.0.is_null() {
                println!("{}", serde_json::to_string_pretty(&ack.0)?);
            }
            println!("Check your inbox for a verification link, then run `authgate signin`.");
        }

        Command::Signin { email } => {
            let email = match email.or_else(|| config.last_email.clone()) {
                Some(email) => email,
                None => prompt_line("Email: ")?,
            };
            let password = prompt_password("Password: ")?;

            manager
                .sign_in(&email, &password)
                .await
                .map_err(display_error)?;

            config.last_email = Some(email.clone());
            if let Err(e) = config.save() {
                tracing::warn!(error = %e, "Failed to save config");
            }
            println!("Signed in as {}.", email);
        }

        Command::Profile { json } => {
            let mut loader = ProfileLoader::new();
            loader.mount(manager.clone());
            match loader.settle().await {
                Loadable::Ready(profile) if json => {
                    println!("{}", serde_json::to_string_pretty(profile)?);
                }
                Loadable::Ready(profile) => {
                    println!("Username: {}", profile.username);
                    println!("Email:    {}", profile.email);
                    println!("Avatar:   {}", profile.avatar);
                }
                Loadable::Error(message) => anyhow::bail!("{}", message),
                Loadable::Pending => anyhow::bail!("Profile request did not finish"),
            }
        }

        Command::Verify { token } => {
            let ack = manager.verify_email(&token).await.map_err(display_error)?;
            println!(
                "{}",
                ack.message.as_deref().unwrap_or("Email verified.")
            );
        }

        Command::Logout => {
            let mut action = LogoutAction::new();
            if let Loadable::Error(message) = action.run(&manager).await {
                anyhow::bail!("{}", message);
            }
            println!("Logged out.");
        }

        Command::Status => {
            match manager.state().map_err(display_error)? {
                SessionState::Authenticated => println!("Signed in"),
                SessionState::Anonymous => println!("Signed out"),
            }
            println!("API:   {}", manager.api().base_url());
            println!("Store: {:?}", config.store);
            if let Some(updated) = manager.store().last_modified() {
                println!("Last change: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
    }

    Ok(())
}

/// Log the full error, surface the display message
fn display_error(err: SessionError) -> anyhow::Error {
    tracing::error!(error = ?err, "Command failed");
    anyhow::anyhow!(user_message(&err))
}

fn prompt_line(prompt: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();
    if input.is_empty() {
        anyhow::bail!("No input given");
    }
    Ok(input)
}

fn prompt_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    if password.is_empty() {
        anyhow::bail!("Password required");
    }
    Ok(password)
}
