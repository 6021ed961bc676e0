//! Favorite command handler

use crate::cli::directory_client;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::render::{get_renderer, Favorites, ResultView, ViewEvent};
use clap::{Args, Subcommand};
use tracing::debug;

/// Favorite command arguments
#[derive(Args)]
pub struct FavoriteArgs {
    #[command(subcommand)]
    pub command: FavoriteCommand,
}

#[derive(Subcommand)]
pub enum FavoriteCommand {
    /// List favorite businesses
    List {
        /// Result view (list, grid, map, json)
        #[arg(long, short = 'V')]
        view: Option<String>,
    },

    /// Add a business to favorites
    Add { id: u64 },

    /// Remove a business from favorites
    Remove { id: u64 },

    /// Add if missing, remove if present
    Toggle { id: u64 },
}

/// Run the favorite command
pub async fn run(args: FavoriteArgs) -> Result<()> {
    let config = Config::load()?;
    let (client, session) = directory_client(&config)?;
    if !session.is_signed_in() {
        return Err(Error::Unauthorized(
            "Sign in first with `localdir session login`".to_string(),
        ));
    }

    match args.command {
        FavoriteCommand::List { view } => {
            let view_name = view.unwrap_or_else(|| config.defaults.view.clone());
            let renderer = get_renderer(&view_name)
                .ok_or_else(|| Error::Config(format!("Unknown view: {}", view_name)))?;

            let businesses = client.favorites().await?;
            let favorites = Favorites::from_businesses(&businesses);
            let output = renderer.render(&ResultView::new(&businesses, favorites.ids()), &config)?;
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        FavoriteCommand::Add { id } => {
            client.add_favorite(id).await?;
            println!("Added {} to favorites", id);
        }
        FavoriteCommand::Remove { id } => {
            client.remove_favorite(id).await?;
            println!("Removed {} from favorites", id);
        }
        FavoriteCommand::Toggle { id } => {
            let mut favorites = Favorites::from_businesses(&client.favorites().await?);
            debug!(event = ?ViewEvent::FavoriteToggled(id), "toggling favorite");
            if favorites.toggle(id) {
                client.add_favorite(id).await?;
                println!("Added {} to favorites", id);
            } else {
                client.remove_favorite(id).await?;
                println!("Removed {} from favorites", id);
            }
        }
    }
    Ok(())
}
