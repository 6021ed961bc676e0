//! Centralized constants for the localdir crate
//!
//! Values shared by the search pipeline, the geo clients and the config
//! defaults live here so they stay consistent.

/// Search pipeline constants
pub mod search {
    /// Page size sent with every business search
    pub const PER_PAGE: u32 = 50;

    /// Category sentinel meaning "no category filter"
    pub const ALL_CATEGORIES: &str = "All Categories";

    /// Distance slider bounds in miles; the maximum means "any distance"
    pub const MIN_DISTANCE_MILES: f64 = 0.5;
    pub const MAX_DISTANCE_MILES: f64 = 10.0;

    /// Rating filter upper bound
    pub const MAX_RATING: f64 = 5.0;

    /// Price tiers are 1..=4
    pub const MIN_PRICE_TIER: u8 = 1;
    pub const MAX_PRICE_TIER: u8 = 4;

    /// Kilometres per mile
    pub const KM_PER_MILE: f64 = 1.60934;

    /// Radius (km) sent for "any distance" around a geocoded place
    pub const ANY_DISTANCE_GEOCODED_KM: f64 = 50.0;

    /// Radius (miles) used for "any distance" around a device position
    pub const ANY_DISTANCE_DEVICE_MILES: f64 = 15.0;
}

/// External API endpoints
pub mod api {
    /// Directory REST backend (local development default)
    pub const DIRECTORY_URL: &str = "http://localhost:8000/api";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP position API (HTTPS, no key required)
    pub const IP_POSITION_URL: &str = "https://ipapi.co/json/";
}

/// Timeouts and cache lifetimes
pub mod timing {
    /// Geocode request timeout
    pub const GEOCODE_TIMEOUT_SECS: u64 = 8;

    /// Geocode cache lifetime (24 hours)
    pub const GEOCODE_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

    /// Position request timeout
    pub const LOCATION_TIMEOUT_SECS: u64 = 15;

    /// Maximum age of a reusable position fix
    pub const LOCATION_MAXIMUM_AGE_SECS: u64 = 300;

    /// Directory API request timeout
    pub const API_TIMEOUT_SECS: u64 = 30;
}

/// Map view constants
pub mod map {
    /// Centre shown when there are no markers (continental US)
    pub const DEFAULT_CENTER_LAT: f64 = 39.8283;
    pub const DEFAULT_CENTER_LNG: f64 = -98.5795;

    /// Zoom used with the default centre
    pub const DEFAULT_ZOOM: u8 = 4;

    /// Zoom applied when panning to a selected marker
    pub const SELECTED_ZOOM: u8 = 15;
}

/// Cache settings
pub mod cache {
    /// Geocode cache file name
    pub const GEOCODE_CACHE_FILE: &str = "geocode_cache.json";

    /// Session file name
    pub const SESSION_FILE: &str = "session.json";
}
