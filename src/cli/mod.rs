//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod directory;
pub mod favorite;
pub mod geocode;
pub mod locate;
pub mod search;
pub mod serve;
pub mod session;

use crate::api::DirectoryClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Local business directory search
#[derive(Parser)]
#[command(name = "localdir")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search businesses
    Search(search::SearchArgs),

    /// List business categories
    Categories(directory::CategoriesArgs),

    /// Show one business
    Show(directory::ShowArgs),

    /// Geocode a place name
    Geocode(geocode::GeocodeArgs),

    /// Find this machine's approximate position
    Locate(locate::LocateArgs),

    /// Sign in and out of the directory
    Session(session::SessionArgs),

    /// Manage favorite businesses
    Favorite(favorite::FavoriteArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Start the local HTTP API (foreground)
    Serve(serve::ServeArgs),
}

/// Install the stderr log subscriber; `RUST_LOG` overrides `default`
pub fn init_logging(default: &str) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .try_init();
}

/// Directory client carrying the saved session's token
pub(crate) fn directory_client(config: &Config) -> Result<(DirectoryClient, Session)> {
    let session = Session::load()?;
    let client = DirectoryClient::from_config(&config.api)?.with_session(&session);
    Ok((client, session))
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve(_), false) => "info",
        _ => "warn",
    };
    init_logging(level);

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Categories(args) => directory::run_categories(args).await,
        Commands::Show(args) => directory::run_show(args).await,
        Commands::Geocode(args) => geocode::run(args).await,
        Commands::Locate(args) => locate::run(args).await,
        Commands::Session(args) => session::run(args).await,
        Commands::Favorite(args) => favorite::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Serve(args) => serve::run(args).await,
    }
}
