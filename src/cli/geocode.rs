//! Geocode command handler
//!
//! Looks up a place name (through the persisted cache), reverse geocodes a
//! coordinate pair, or clears the cache.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{CachedGeocoder, GeoLocation, Geocoder};
use crate::search::parse_coordinates;
use clap::Args;

/// Geocode command arguments
#[derive(Args)]
pub struct GeocodeArgs {
    /// Place name to look up
    #[arg(required_unless_present_any = ["reverse", "clear_cache"])]
    pub query: Option<String>,

    /// Reverse geocode "lat,lng" instead
    #[arg(long, allow_hyphen_values = true, conflicts_with = "query")]
    pub reverse: Option<String>,

    /// Remove every cached lookup
    #[arg(long)]
    pub clear_cache: bool,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the geocode command
pub async fn run(args: GeocodeArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = CachedGeocoder::persistent_from_config(&config.geocode)?;

    if args.clear_cache {
        let count = geocoder.cache().len();
        geocoder.cache().clear();
        println!("Cleared {} cached lookups", count);
        if args.query.is_none() && args.reverse.is_none() {
            return Ok(());
        }
    }

    let (label, found) = if let Some(pair) = &args.reverse {
        let coords = parse_coordinates(pair)?;
        (
            pair.clone(),
            geocoder.reverse(coords.latitude, coords.longitude).await,
        )
    } else {
        let query = args.query.unwrap_or_default();
        let found = geocoder.geocode(&query).await;
        (query, found)
    };

    let location = found.ok_or_else(|| Error::Geocoding(format!("No match for '{}'", label)))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&location)?);
    } else {
        println!("{}", describe(&location));
    }
    Ok(())
}

fn describe(location: &GeoLocation) -> String {
    match &location.display_name {
        Some(name) => format!(
            "{:.6}, {:.6}  {}",
            location.latitude, location.longitude, name
        ),
        None => format!("{:.6}, {:.6}", location.latitude, location.longitude),
    }
}
