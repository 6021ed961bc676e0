//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for geocoding.
//! The usage policy requires an identifying User-Agent on every request.

use crate::config::GeocodeConfig;
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, GeoLocation};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimBackend {
    /// Create a backend against `base_url`
    ///
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        if user_agent.trim().is_empty() {
            return Err(Error::Config(
                "Nominatim requires an identifying user agent".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a backend from the `[geocode]` config section
    pub fn from_config(config: &GeocodeConfig) -> Result<Self> {
        Self::new(&config.url, &config.user_agent, config.timeout())
    }

    /// Parse lat/lng strings to finite f64 values
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let parse = |label: &str, value: &str| -> Result<f64> {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::Geocoding(format!("Invalid {}: {}", label, value)))
        };
        Ok((parse("latitude", lat)?, parse("longitude", lng)?))
    }

    fn to_location(result: NominatimResult) -> Result<GeoLocation> {
        let (latitude, longitude) = Self::parse_coords(&result.lat, &result.lon)?;
        Ok(GeoLocation {
            latitude,
            longitude,
            display_name: result.display_name,
        })
    }

    async fn get(&self, url: &str) -> Result<Option<reqwest::Response>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }
        Ok(Some(response))
    }
}

impl GeoBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!(%query, "nominatim search");

        let Some(response) = self.get(&url).await? else {
            return Ok(None);
        };

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        results.into_iter().next().map(Self::to_location).transpose()
    }

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json",
            self.base_url, lat, lng
        );

        let Some(response) = self.get(&url).await? else {
            return Ok(None);
        };

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        // An unresolvable point comes back as 200 {"error": "Unable to geocode"}
        if body.get("error").is_some() {
            return Ok(None);
        }

        let result: NominatimResult = serde_json::from_value(body)?;
        Self::to_location(result).map(Some)
    }
}
