//! Server shared state
//!
//! One geocoder (and so one geocode cache), one directory client and one
//! position adapter shared by every request.

use crate::api::DirectoryClient;
use crate::config::Config;
use crate::error::Result;
use crate::geo::{CachedGeocoder, Geolocator, IpPositionSource, NominatimBackend, PositionOptions};
use std::sync::Arc;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState {
    pub config: Config,
    pub geocoder: Arc<CachedGeocoder<NominatimBackend>>,
    pub directory: DirectoryClient,
    pub locator: Geolocator<IpPositionSource>,
    started: Instant,
}

impl AppState {
    /// Build every client from configuration
    pub fn new(config: Config) -> Result<Self> {
        let geocoder = CachedGeocoder::from_config(&config.geocode)?;
        let directory = DirectoryClient::from_config(&config.api)?;
        let locator = Geolocator::with_options(
            IpPositionSource::from_config(&config.location),
            PositionOptions::from(&config.location),
        );
        Ok(Self::with_parts(config, geocoder, directory, locator))
    }

    pub fn with_parts(
        config: Config,
        geocoder: CachedGeocoder<NominatimBackend>,
        directory: DirectoryClient,
        locator: Geolocator<IpPositionSource>,
    ) -> Self {
        Self {
            config,
            geocoder: Arc::new(geocoder),
            directory,
            locator,
            started: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
