//! "Near me" position adapter
//!
//! Wraps a platform position source and classifies every failure into one of
//! a fixed set of user-facing messages. Capability and secure-context checks
//! run before the source is asked for a fix.

use crate::config::LocationConfig;
use crate::model::Coordinates;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Options passed to the position source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// A previous fix younger than this is reused
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(crate::constants::timing::LOCATION_TIMEOUT_SECS),
            maximum_age: Duration::from_secs(crate::constants::timing::LOCATION_MAXIMUM_AGE_SECS),
        }
    }
}

impl From<&LocationConfig> for PositionOptions {
    fn from(config: &LocationConfig) -> Self {
        Self {
            enable_high_accuracy: config.high_accuracy,
            timeout: Duration::from_secs(config.timeout_secs),
            maximum_age: Duration::from_secs(config.maximum_age_secs),
        }
    }
}

/// Failure reported by a position source once dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

/// A platform position API
pub trait PositionSource: Send + Sync {
    /// Whether this platform can provide a position at all
    fn is_supported(&self) -> bool;

    /// Whether the source is reached over a secure channel
    fn is_secure_context(&self) -> bool;

    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinates, PositionError>> + Send;
}

/// Classified location failure; `Display` is the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported on this device.")]
    Unsupported,

    #[error("Location access requires a secure connection (HTTPS). Please use the HTTPS address or enter a location manually.")]
    InsecureContext,

    #[error("Location permission denied. Please allow location access or enter a location manually.")]
    PermissionDenied,

    #[error("Location information is unavailable. Please enter a location manually.")]
    Unavailable,

    #[error("Location request timed out. Please try again or enter a location manually.")]
    Timeout,
}

impl From<PositionError> for LocationError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => Self::PermissionDenied,
            PositionError::PositionUnavailable => Self::Unavailable,
            PositionError::Timeout => Self::Timeout,
        }
    }
}

/// `{coords, error}` pair with exactly one side set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationOutcome {
    pub coords: Option<Coordinates>,
    pub error: Option<String>,
}

impl From<Result<Coordinates, LocationError>> for LocationOutcome {
    fn from(result: Result<Coordinates, LocationError>) -> Self {
        match result {
            Ok(coords) => Self {
                coords: Some(coords),
                error: None,
            },
            Err(e) => Self {
                coords: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Position adapter over a [`PositionSource`]
#[derive(Debug)]
pub struct Geolocator<S> {
    source: S,
    options: PositionOptions,
    last_fix: Mutex<Option<(Coordinates, Instant)>>,
}

impl<S: PositionSource> Geolocator<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, PositionOptions::default())
    }

    pub fn with_options(source: S, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            last_fix: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Get the current position
    pub async fn get_location(&self) -> Result<Coordinates, LocationError> {
        if !self.source.is_supported() {
            return Err(LocationError::Unsupported);
        }
        if !self.source.is_secure_context() {
            return Err(LocationError::InsecureContext);
        }

        if let Some(coords) = self.recent_fix() {
            debug!("reusing recent position fix");
            return Ok(coords);
        }

        let result = tokio::time::timeout(
            self.options.timeout,
            self.source.current_position(&self.options),
        )
        .await
        .unwrap_or(Err(PositionError::Timeout));

        match result {
            Ok(coords) => {
                *self.last_fix.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some((coords, Instant::now()));
                Ok(coords)
            }
            Err(e) => {
                warn!(error = ?e, "position request failed");
                Err(e.into())
            }
        }
    }

    /// Same as [`get_location`](Self::get_location), as a `{coords, error}` pair
    pub async fn locate(&self) -> LocationOutcome {
        self.get_location().await.into()
    }

    /// Forget the cached fix
    pub fn clear(&self) {
        *self.last_fix.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn recent_fix(&self) -> Option<Coordinates> {
        let guard = self.last_fix.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|(_, at)| at.elapsed() < self.options.maximum_age)
            .map(|(coords, _)| *coords)
    }
}
