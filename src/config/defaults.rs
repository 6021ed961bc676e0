//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, timing};

/// Directory REST backend base URL
pub const DEFAULT_API_URL: &str = api::DIRECTORY_URL;

/// Directory API request timeout in seconds
pub const DEFAULT_API_TIMEOUT_SECS: u64 = timing::API_TIMEOUT_SECS;

/// Nominatim base URL
pub const DEFAULT_GEOCODE_URL: &str = api::NOMINATIM_URL;

/// Identifying User-Agent required by Nominatim's usage policy
pub const DEFAULT_USER_AGENT: &str = concat!("localdir/", env!("CARGO_PKG_VERSION"));

/// Geocode request timeout in seconds
pub const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = timing::GEOCODE_TIMEOUT_SECS;

/// Geocode cache lifetime in seconds
pub const DEFAULT_GEOCODE_CACHE_TTL_SECS: u64 = timing::GEOCODE_CACHE_TTL_SECS;

/// IP position endpoint
pub const DEFAULT_POSITION_URL: &str = api::IP_POSITION_URL;

/// Position request timeout in seconds
pub const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = timing::LOCATION_TIMEOUT_SECS;

/// Maximum age of a reusable position fix in seconds
pub const DEFAULT_LOCATION_MAXIMUM_AGE_SECS: u64 = timing::LOCATION_MAXIMUM_AGE_SECS;

/// Default result view
pub const DEFAULT_VIEW: &str = "list";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "localdir";
