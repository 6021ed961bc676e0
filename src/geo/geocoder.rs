//! Cached, infallible geocoder
//!
//! Wraps a [`GeoBackend`] with a [`GeocodeCache`]. Lookups never fail: empty
//! input, no match and backend errors all come back as `None`, and only
//! successful numeric results are cached.

use crate::config::GeocodeConfig;
use crate::error::Result;
use crate::geo::{normalize_query, GeoBackend, GeoLocation, GeocodeCache, Geocoder, NominatimBackend};
use tracing::{debug, warn};

/// Geocoder with a result cache in front of a backend
#[derive(Debug)]
pub struct CachedGeocoder<B> {
    backend: B,
    cache: GeocodeCache,
}

impl<B: GeoBackend> CachedGeocoder<B> {
    pub fn new(backend: B, cache: GeocodeCache) -> Self {
        Self { backend, cache }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    /// Reverse lookup; failures are logged and yield `None`
    pub async fn reverse(&self, lat: f64, lng: f64) -> Option<GeoLocation> {
        match self.backend.reverse_geocode(lat, lng).await {
            Ok(found) => found,
            Err(e) => {
                warn!(lat, lng, error = %e, "reverse geocode failed");
                None
            }
        }
    }
}

impl CachedGeocoder<NominatimBackend> {
    /// Nominatim geocoder with an in-memory cache
    pub fn from_config(config: &GeocodeConfig) -> Result<Self> {
        Ok(Self::new(
            NominatimBackend::from_config(config)?,
            GeocodeCache::in_memory(config.cache_ttl()),
        ))
    }

    /// Nominatim geocoder whose cache is mirrored to the default cache file
    /// when the config asks for it
    pub fn persistent_from_config(config: &GeocodeConfig) -> Result<Self> {
        let cache = if config.persist_cache {
            GeocodeCache::with_path(GeocodeCache::default_path()?, config.cache_ttl())
        } else {
            GeocodeCache::in_memory(config.cache_ttl())
        };
        Ok(Self::new(NominatimBackend::from_config(config)?, cache))
    }
}

impl<B: GeoBackend> Geocoder for CachedGeocoder<B> {
    async fn geocode(&self, query: &str) -> Option<GeoLocation> {
        let key = normalize_query(query);
        if key.is_empty() {
            return None;
        }

        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, "geocode cache hit");
            return Some(hit);
        }

        debug!(%key, "geocode cache miss");
        match self.backend.geocode(query.trim()).await {
            Ok(Some(location))
                if location.latitude.is_finite() && location.longitude.is_finite() =>
            {
                self.cache.insert(&key, location.clone());
                Some(location)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(%key, error = %e, "geocode failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Backend that answers from a fixed table and counts calls
    struct CountingBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GeoBackend for CountingBackend {
        async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Geocoding("connection reset".to_string()));
            }
            Ok(match query {
                "New York" | "new york" => Some(GeoLocation {
                    latitude: 40.7128,
                    longitude: -74.0060,
                    display_name: Some("New York, USA".to_string()),
                }),
                "Bad" => Some(GeoLocation {
                    latitude: f64::NAN,
                    longitude: 0.0,
                    display_name: None,
                }),
                _ => None,
            })
        }

        async fn reverse_geocode(&self, _lat: f64, _lng: f64) -> Result<Option<GeoLocation>> {
            Err(Error::Geocoding("unsupported".to_string()))
        }
    }

    fn cached(backend: CountingBackend) -> CachedGeocoder<CountingBackend> {
        CachedGeocoder::new(backend, GeocodeCache::in_memory(Duration::from_secs(86_400)))
    }

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let geocoder = cached(CountingBackend::new());

        let first = geocoder.geocode("New York").await;
        let second = geocoder.geocode("New York").await;

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(geocoder.backend().calls(), 1);
    }

    #[tokio::test]
    async fn test_key_is_normalized() {
        let geocoder = cached(CountingBackend::new());

        geocoder.geocode("New York").await;
        geocoder.geocode("  NEW YORK ").await;

        assert_eq!(geocoder.backend().calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_skips_network() {
        let geocoder = cached(CountingBackend::new());

        assert!(geocoder.geocode("   ").await.is_none());
        assert_eq!(geocoder.backend().calls(), 0);
    }

    #[tokio::test]
    async fn test_misses_and_failures_not_cached() {
        let geocoder = cached(CountingBackend::new());
        assert!(geocoder.geocode("Atlantis").await.is_none());
        assert!(geocoder.geocode("Atlantis").await.is_none());
        assert_eq!(geocoder.backend().calls(), 2);

        let failing = cached(CountingBackend::failing());
        assert!(failing.geocode("New York").await.is_none());
        assert!(failing.cache().is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_result_rejected() {
        let geocoder = cached(CountingBackend::new());
        assert!(geocoder.geocode("Bad").await.is_none());
        assert!(geocoder.cache().is_empty());
    }

    #[tokio::test]
    async fn test_reverse_failure_is_none() {
        let geocoder = cached(CountingBackend::new());
        assert!(geocoder.reverse(1.0, 2.0).await.is_none());
    }
}
