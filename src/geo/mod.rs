//! Geocoding and device position
//!
//! Provides place-name geocoding through Nominatim (with a 24h cache) and the
//! "near me" position adapter.

pub mod cache;
pub mod device;
pub mod geocoder;
pub mod ip_location;
pub mod nominatim;

use crate::error::Result;
use crate::model::Coordinates;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

pub use cache::GeocodeCache;
pub use device::{Geolocator, LocationError, LocationOutcome, PositionOptions, PositionSource};
pub use geocoder::CachedGeocoder;
pub use ip_location::IpPositionSource;
pub use nominatim::NominatimBackend;

/// A geocoded location result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Address or description, when the service provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl GeoLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Trait for geocoding services
///
/// Backends report transport and parse failures as errors; callers that must
/// never fail go through [`Geocoder`].
pub trait GeoBackend: Send + Sync {
    /// Geocode a location string to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(&self, query: &str) -> impl Future<Output = Result<Option<GeoLocation>>> + Send;

    /// Reverse geocode coordinates to a location name
    fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> impl Future<Output = Result<Option<GeoLocation>>> + Send;
}

/// Infallible place lookup used by the search pipeline
///
/// Empty input, no match and any failure all yield `None`.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> impl Future<Output = Option<GeoLocation>> + Send;
}

impl<T: Geocoder> Geocoder for Arc<T> {
    async fn geocode(&self, query: &str) -> Option<GeoLocation> {
        (**self).geocode(query).await
    }
}

/// Normalized cache key: trimmed and lower-cased
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
