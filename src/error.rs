//! Error types for localdir

use thiserror::Error;

/// Main error type for localdir operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("{0}")]
    Location(#[from] crate::geo::LocationError),

    #[error("{0}")]
    Search(String),
}

/// Result type alias for localdir operations
pub type Result<T> = std::result::Result<T, Error>;
