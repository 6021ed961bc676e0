//! Search command handler
//!
//! Builds a search from flags (optionally seeded from a shared query
//! string), runs it once and renders the results.

use crate::cli::directory_client;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{
    CachedGeocoder, Geolocator, IpPositionSource, LocationError, PositionOptions, PositionSource,
};
use crate::model::Coordinates;
use crate::render::{available_views, get_renderer, Favorites, ResultView};
use crate::search::{build_params, parse_coordinates, PriceRange, SearchController, SearchState, SortOption};
use clap::Args;
use tracing::{info, warn};

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Search text (business name or, with no --location, a place)
    pub query: Option<String>,

    /// Place to search around (geocoded)
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Search around this machine's position
    #[arg(long, conflicts_with = "coords")]
    pub near_me: bool,

    /// Search around "lat,lng"
    #[arg(long, allow_hyphen_values = true)]
    pub coords: Option<String>,

    /// Category name
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Minimum rating (0-5)
    #[arg(long)]
    pub min_rating: Option<f64>,

    /// Maximum distance in miles (0.5-10, 10 = any)
    #[arg(long, short = 'd')]
    pub max_distance: Option<f64>,

    /// Only businesses open now
    #[arg(long)]
    pub open_now: bool,

    /// Price tiers, e.g. "2,3" or "1"
    #[arg(long, short = 'p')]
    pub price: Option<PriceRange>,

    /// Sort order (relevance, rating, distance, reviews, newest, name)
    #[arg(long, short = 's')]
    pub sort: Option<SortOption>,

    /// Seed the search from a shared query string ("q=pizza&open_now=true")
    #[arg(long)]
    pub from_url: Option<String>,

    /// Result view (list, grid, map, json)
    #[arg(long, short = 'V')]
    pub view: Option<String>,

    /// Business id to highlight
    #[arg(long)]
    pub select: Option<u64>,

    /// Print the request parameters without searching
    #[arg(long)]
    pub dry_run: bool,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available views
    #[arg(long = "list-views")]
    pub list_views: bool,
}

/// Apply command-line flags on top of a seeded state
fn apply_args(state: &mut SearchState, args: &SearchArgs) -> Result<()> {
    if let Some(query) = &args.query {
        state.query = query.clone();
    }
    if let Some(location) = &args.location {
        state.location = location.clone();
    }
    if let Some(coords) = &args.coords {
        state.user_coords = Some(parse_coordinates(coords)?);
    }
    if let Some(category) = &args.category {
        state.filters.category = category.clone();
    }
    if let Some(min_rating) = args.min_rating {
        state.filters.min_rating = min_rating;
    }
    if let Some(max_distance) = args.max_distance {
        state.filters.max_distance = max_distance;
    }
    if args.open_now {
        state.filters.open_now = true;
    }
    if let Some(price) = args.price {
        state.filters.price_range = price;
    }
    if let Some(sort) = args.sort {
        state.sort_by = sort;
    }
    state.filters.validate()
}

/// Locator for this machine's position
pub(crate) fn device_locator(config: &Config) -> Geolocator<IpPositionSource> {
    Geolocator::with_options(
        IpPositionSource::from_config(&config.location),
        PositionOptions::from(&config.location),
    )
}

/// Position of this machine, with the fixed failure messages
pub(crate) async fn locate_device(config: &Config) -> std::result::Result<Coordinates, LocationError> {
    device_locator(config).get_location().await
}

/// Search around the device position when one is available
///
/// A failed lookup is reported and the search continues without
/// coordinates. Returns whether a position was applied.
async fn apply_device_position<S: PositionSource>(
    state: &mut SearchState,
    locator: &Geolocator<S>,
) -> bool {
    match locator.get_location().await {
        Ok(coords) => {
            eprintln!("Using device position: {:.4}, {:.4}", coords.latitude, coords.longitude);
            state.user_coords = Some(coords);
            true
        }
        Err(e) => {
            warn!(error = %e, "device position unavailable");
            eprintln!("{}", e);
            false
        }
    }
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.list_views {
        list_views();
        return Ok(());
    }

    let config = Config::load()?;
    let view_name = args.view.clone().unwrap_or_else(|| config.defaults.view.clone());
    let renderer = get_renderer(&view_name)
        .ok_or_else(|| Error::Config(format!("Unknown view: {}", view_name)))?;

    let mut state = args
        .from_url
        .as_deref()
        .map(SearchState::from_query_string)
        .unwrap_or_default();
    apply_args(&mut state, &args)?;

    if args.near_me {
        apply_device_position(&mut state, &device_locator(&config)).await;
    }

    let geocoder = CachedGeocoder::persistent_from_config(&config.geocode)?;

    if args.dry_run {
        let (params, resolved) = build_params(&state, &geocoder).await;
        println!("{}", serde_json::to_string_pretty(&params)?);
        if let Some(resolved) = resolved {
            eprintln!("Coordinates from {:?}", resolved.source);
        }
        return Ok(());
    }

    let (client, session) = directory_client(&config)?;
    let favorites = if session.is_signed_in() {
        match client.favorites().await {
            Ok(businesses) => Favorites::from_businesses(&businesses),
            Err(e) => {
                warn!(error = %e, "could not load favorites");
                Favorites::default()
            }
        }
    } else {
        Favorites::default()
    };

    let mut controller = SearchController::with_state(state, geocoder, client);
    let state = controller.search().await;
    if let Some(error) = &state.error {
        return Err(Error::Search(error.clone()));
    }
    info!(shown = state.results.len(), total = state.total, "search complete");

    let view = ResultView::new(&state.results, favorites.ids()).with_selected(args.select);
    let mut output = renderer.render(&view, &config)?;
    if matches!(renderer.name(), "list" | "grid") && !state.results.is_empty() {
        output.push_str(&format!(
            "\nShowing {} of {} businesses\n",
            state.results.len(),
            state.total
        ));
    }

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

/// Print available result views
fn list_views() {
    println!("Available views:");
    for view in available_views() {
        println!("  {:5} - {}", view.name, view.description);
    }
}
