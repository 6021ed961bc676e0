//! Locate command handler

use crate::cli::search::locate_device;
use crate::config::Config;
use crate::error::Result;
use crate::geo::{CachedGeocoder, LocationOutcome};
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Also look up a place name for the position
    #[arg(long)]
    pub name: bool,

    /// Print `{coords, error}` JSON instead of failing
    #[arg(long)]
    pub json: bool,

    /// Print a map link for the position
    #[arg(long)]
    pub url: bool,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<()> {
    let config = Config::load()?;
    let result = locate_device(&config).await;

    if args.json {
        let outcome = LocationOutcome::from(result);
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let coords = result?;
    println!("{:.6}, {:.6}", coords.latitude, coords.longitude);

    if args.name {
        let geocoder = CachedGeocoder::persistent_from_config(&config.geocode)?;
        if let Some(place) = geocoder.reverse(coords.latitude, coords.longitude).await {
            if let Some(name) = place.display_name {
                println!("{}", name);
            }
        }
    }

    if args.url {
        println!(
            "{}",
            config.format_url(None, coords.latitude, coords.longitude)?
        );
    }
    Ok(())
}
