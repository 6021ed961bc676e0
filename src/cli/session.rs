//! Session command handler
//!
//! Sign in to the directory, sign out, and show who is signed in.

use crate::cli::directory_client;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::GeocodeCache;
use clap::{Args, Subcommand};
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Session command arguments
#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Sign in with email and password
    Login {
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "LOCALDIR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the saved token
    Logout,

    /// Show the signed-in user
    Status,
}

/// Run the session command
pub async fn run(args: SessionArgs) -> Result<()> {
    let config = Config::load()?;
    let (client, mut session) = directory_client(&config)?;

    match args.command {
        SessionCommand::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            let login = client.login(&email, &password).await?;
            session.sign_in(login.token, login.user);
            session.save()?;
            match session.user() {
                Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
                None => println!("Signed in as {}", email),
            }
        }
        SessionCommand::Logout => {
            if !session.is_signed_in() {
                println!("Not signed in");
                return Ok(());
            }
            if let Err(e) = client.logout().await {
                warn!(error = %e, "server-side logout failed, clearing local session anyway");
            }
            session.clear()?;
            GeocodeCache::discard(&GeocodeCache::default_path()?)?;
            println!("Signed out");
        }
        SessionCommand::Status => match (session.is_signed_in(), session.user()) {
            (true, Some(user)) => println!("Signed in as {} <{}>", user.name, user.email),
            (true, None) => println!("Signed in"),
            (false, _) => println!("Not signed in"),
        },
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(Error::Session("Password must not be empty".to_string()));
    }
    Ok(password)
}
