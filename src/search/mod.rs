//! Business search
//!
//! Filters and sort order, the page state they live in, the mapping from that
//! state to backend request parameters, and the controller that keeps results
//! in sync with it.

pub mod controller;
pub mod filters;
pub mod params;
pub mod state;

pub use controller::{PendingSearch, SearchChange, SearchController};
pub use filters::{Filters, PriceRange, SortOption};
pub use params::{build_params, CoordinateSource, ResolvedCoordinates, SearchParams};
pub use state::{parse_coordinates, SearchState};
