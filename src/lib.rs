//! localdir: local business directory search client
//!
//! A library and CLI tool that turns a search intent (text, place, device
//! position, filters, sort order) into one query against a directory REST
//! backend, and renders the results as a list, a grid or a map model.
//!
//! ## Features
//!
//! - Search parameter assembly with coordinate resolution
//! - Nominatim geocoding with a 24h cache
//! - "Near me" position lookup with fixed, user-facing failure messages
//! - List, grid, map (GeoJSON) and JSON views
//! - Sign-in session and favorites
//! - Local HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use localdir::api::DirectoryClient;
//! use localdir::config::Config;
//! use localdir::geo::CachedGeocoder;
//! use localdir::search::{SearchChange, SearchController};
//!
//! # async fn example() -> localdir::Result<()> {
//! let config = Config::default();
//! let geocoder = CachedGeocoder::from_config(&config.geocode)?;
//! let client = DirectoryClient::from_config(&config.api)?;
//!
//! let mut controller = SearchController::new(geocoder, client);
//! controller
//!     .apply(SearchChange::Location("Boston".to_string()))
//!     .await?;
//!
//! for business in controller.results() {
//!     println!("{}", business.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod model;
pub mod render;
pub mod search;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use model::{Business, BusinessType, Coordinates, DisplaySection};
pub use search::{Filters, SearchController, SearchParams, SearchState, SortOption};
