//! Outbound search parameters
//!
//! Turns a [`SearchState`] into the query string of one
//! `GET /public/businesses` call. Coordinate resolution is the only step that
//! can touch the network (geocoding); everything else is a pure mapping.

use crate::constants::search::{
    ANY_DISTANCE_DEVICE_MILES, ANY_DISTANCE_GEOCODED_KM, KM_PER_MILE, MAX_DISTANCE_MILES, PER_PAGE,
};
use crate::geo::Geocoder;
use crate::model::Coordinates;
use crate::search::filters::SortOption;
use crate::search::state::SearchState;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Query parameters for the business search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            per_page: PER_PAGE,
            search: None,
            category: None,
            min_rating: None,
            price_range: None,
            is_open: None,
            sort_by: None,
            latitude: None,
            longitude: None,
            location: None,
            radius_km: None,
        }
    }
}

/// Where resolved coordinates came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum CoordinateSource {
    /// The device position ("near me")
    Device,
    /// The typed location text
    GeocodedLocation(String),
    /// The query text, taken as a place name because no location was typed
    GeocodedQuery(String),
}

impl CoordinateSource {
    pub fn is_geocoded(&self) -> bool {
        !matches!(self, Self::Device)
    }

    /// Text that was geocoded, if any
    pub fn geocoded_text(&self) -> Option<&str> {
        match self {
            Self::Device => None,
            Self::GeocodedLocation(text) | Self::GeocodedQuery(text) => Some(text),
        }
    }
}

/// Coordinates plus their provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCoordinates {
    pub coords: Coordinates,
    pub source: CoordinateSource,
}

/// Round to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Radius around a geocoded place; "any distance" is 50 km
pub fn geocoded_radius_km(max_distance_miles: f64) -> f64 {
    if max_distance_miles >= MAX_DISTANCE_MILES {
        round1(ANY_DISTANCE_GEOCODED_KM)
    } else {
        round1(max_distance_miles * KM_PER_MILE)
    }
}

/// Radius around the device position; "any distance" is 15 miles
pub fn device_radius_km(max_distance_miles: f64) -> f64 {
    let miles = if max_distance_miles >= MAX_DISTANCE_MILES {
        ANY_DISTANCE_DEVICE_MILES
    } else {
        max_distance_miles
    };
    round1(miles * KM_PER_MILE)
}

/// Resolve coordinates in priority order: device position, typed location,
/// then the query text itself
pub async fn resolve_coordinates<G: Geocoder>(
    state: &SearchState,
    geocoder: &G,
) -> Option<ResolvedCoordinates> {
    if let Some(coords) = state.user_coords {
        return Some(ResolvedCoordinates {
            coords,
            source: CoordinateSource::Device,
        });
    }

    let location = state.location.trim();
    if !location.is_empty() {
        return geocoder
            .geocode(location)
            .await
            .map(|found| ResolvedCoordinates {
                coords: found.coordinates(),
                source: CoordinateSource::GeocodedLocation(location.to_string()),
            });
    }

    let query = state.query.trim();
    if !query.is_empty() {
        return geocoder.geocode(query).await.map(|found| ResolvedCoordinates {
            coords: found.coordinates(),
            source: CoordinateSource::GeocodedQuery(query.to_string()),
        });
    }

    None
}

/// Map state plus resolved coordinates to request parameters
pub fn assemble(state: &SearchState, resolved: Option<&ResolvedCoordinates>) -> SearchParams {
    let filters = &state.filters;
    let query = state.query.trim();

    let mut params = SearchParams {
        category: filters.category_filter().map(str::to_string),
        min_rating: (filters.min_rating > 0.0).then_some(filters.min_rating),
        price_range: (!filters.price_range.is_full()).then(|| filters.price_range.to_string()),
        is_open: filters.open_now.then_some(true),
        sort_by: (state.sort_by != SortOption::Relevance).then_some(state.sort_by),
        ..SearchParams::default()
    };

    let geocoded_from_search =
        matches!(resolved, Some(r) if matches!(r.source, CoordinateSource::GeocodedQuery(_)));

    // A query consumed as a place name is not also a name filter
    if !geocoded_from_search && !query.is_empty() {
        params.search = Some(query.to_string());
    }

    if let Some(resolved) = resolved {
        params.latitude = Some(resolved.coords.latitude);
        params.longitude = Some(resolved.coords.longitude);

        match resolved.source.geocoded_text() {
            Some(text) => {
                params.location = Some(text.to_string());
                params.radius_km = Some(geocoded_radius_km(filters.max_distance));
            }
            None => {
                params.radius_km = Some(device_radius_km(filters.max_distance));
            }
        }
    }

    params
}

/// Resolve coordinates and assemble parameters in one step
pub async fn build_params<G: Geocoder>(
    state: &SearchState,
    geocoder: &G,
) -> (SearchParams, Option<ResolvedCoordinates>) {
    let resolved = resolve_coordinates(state, geocoder).await;
    let params = assemble(state, resolved.as_ref());
    debug!(?params, "assembled search parameters");
    (params, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoLocation;
    use crate::search::filters::{Filters, PriceRange};
    use approx::assert_relative_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Geocoder answering from a table and recording every lookup
    #[derive(Default)]
    struct TableGeocoder {
        places: HashMap<String, (f64, f64)>,
        lookups: Mutex<Vec<String>>,
    }

    impl TableGeocoder {
        fn with(places: &[(&str, f64, f64)]) -> Self {
            Self {
                places: places
                    .iter()
                    .map(|(name, lat, lng)| (name.to_string(), (*lat, *lng)))
                    .collect(),
                lookups: Mutex::new(Vec::new()),
            }
        }

        fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }
    }

    impl Geocoder for TableGeocoder {
        async fn geocode(&self, query: &str) -> Option<GeoLocation> {
            self.lookups.lock().unwrap().push(query.to_string());
            self.places.get(query).map(|(lat, lng)| GeoLocation {
                latitude: *lat,
                longitude: *lng,
                display_name: None,
            })
        }
    }

    fn state() -> SearchState {
        SearchState::default()
    }

    #[test]
    fn test_default_filters_emit_nothing_optional() {
        let params = assemble(&state(), None);
        assert_eq!(params, SearchParams::default());

        let query = serde_json::to_value(&params).unwrap();
        for key in ["category", "min_rating", "price_range", "is_open", "sort_by"] {
            assert!(query.get(key).is_none(), "{} should be omitted", key);
        }
        assert_eq!(query["per_page"], 50);
    }

    #[test]
    fn test_each_filter_maps_to_its_param() {
        let mut state = state();
        state.filters = Filters {
            category: "Cafes".to_string(),
            min_rating: 4.0,
            max_distance: 3.0,
            open_now: true,
            price_range: PriceRange::new(2, 3).unwrap(),
        };
        state.sort_by = SortOption::Rating;

        let params = assemble(&state, None);
        assert_eq!(params.category.as_deref(), Some("Cafes"));
        assert_eq!(params.min_rating, Some(4.0));
        assert_eq!(params.price_range.as_deref(), Some("2,3"));
        assert_eq!(params.is_open, Some(true));
        assert_eq!(params.sort_by, Some(SortOption::Rating));
        // Distance only matters once there are coordinates
        assert_eq!(params.radius_km, None);
    }

    #[test]
    fn test_query_is_trimmed() {
        let mut state = state();
        state.query = "  pizza  ".to_string();
        assert_eq!(assemble(&state, None).search.as_deref(), Some("pizza"));

        state.query = "   ".to_string();
        assert_eq!(assemble(&state, None).search, None);
    }

    #[tokio::test]
    async fn test_device_coords_skip_geocoding() {
        let geocoder = TableGeocoder::with(&[("Paris", 48.85, 2.35)]);
        let mut state = state();
        state.query = "bakery".to_string();
        state.user_coords = Some(Coordinates::new(42.36, -71.06));
        state.filters.max_distance = 2.0;

        let (params, resolved) = build_params(&state, &geocoder).await;

        assert!(geocoder.lookups().is_empty());
        assert_eq!(resolved.unwrap().source, CoordinateSource::Device);
        assert_eq!(params.latitude, Some(42.36));
        assert_eq!(params.longitude, Some(-71.06));
        assert_eq!(params.search.as_deref(), Some("bakery"));
        assert_eq!(params.location, None);
        assert_eq!(params.radius_km, Some(3.2));
    }

    #[tokio::test]
    async fn test_device_coords_win_over_typed_location() {
        let geocoder = TableGeocoder::with(&[("Paris", 48.85, 2.35)]);
        let mut state = state();
        state.location = "Paris".to_string();
        state.user_coords = Some(Coordinates::new(1.0, 2.0));

        let (params, _) = build_params(&state, &geocoder).await;
        assert!(geocoder.lookups().is_empty());
        assert_eq!(params.latitude, Some(1.0));
        assert_eq!(params.location, None);
    }

    #[tokio::test]
    async fn test_typed_location_geocoded() {
        let geocoder = TableGeocoder::with(&[("Paris", 48.85, 2.35)]);
        let mut state = state();
        state.query = "croissant".to_string();
        state.location = " Paris ".to_string();
        state.filters.max_distance = 5.0;

        let (params, resolved) = build_params(&state, &geocoder).await;

        assert_eq!(geocoder.lookups(), vec!["Paris".to_string()]);
        assert_eq!(
            resolved.unwrap().source,
            CoordinateSource::GeocodedLocation("Paris".to_string())
        );
        assert_eq!(params.search.as_deref(), Some("croissant"));
        assert_eq!(params.location.as_deref(), Some("Paris"));
        assert_eq!(params.latitude, Some(48.85));
        assert_eq!(params.radius_km, Some(8.0));
    }

    #[tokio::test]
    async fn test_query_geocoded_when_no_location() {
        let geocoder = TableGeocoder::with(&[("Boston", 42.36, -71.06)]);
        let mut state = state();
        state.query = "Boston".to_string();

        let (params, resolved) = build_params(&state, &geocoder).await;

        assert_eq!(
            resolved.unwrap().source,
            CoordinateSource::GeocodedQuery("Boston".to_string())
        );
        assert_eq!(params.search, None);
        assert_eq!(params.location.as_deref(), Some("Boston"));
        assert_eq!(params.latitude, Some(42.36));
        assert_eq!(params.radius_km, Some(50.0));
    }

    #[tokio::test]
    async fn test_failed_query_geocode_keeps_name_filter() {
        let geocoder = TableGeocoder::default();
        let mut state = state();
        state.query = "Joe's Diner".to_string();

        let (params, resolved) = build_params(&state, &geocoder).await;

        assert!(resolved.is_none());
        assert_eq!(geocoder.lookups(), vec!["Joe's Diner".to_string()]);
        assert_eq!(params.search.as_deref(), Some("Joe's Diner"));
        assert_eq!(params.latitude, None);
        assert_eq!(params.location, None);
        assert_eq!(params.radius_km, None);
    }

    #[tokio::test]
    async fn test_failed_location_geocode_does_not_fall_back_to_query() {
        let geocoder = TableGeocoder::with(&[("Boston", 42.36, -71.06)]);
        let mut state = state();
        state.query = "Boston".to_string();
        state.location = "Atlantis".to_string();

        let (params, resolved) = build_params(&state, &geocoder).await;

        assert!(resolved.is_none());
        assert_eq!(geocoder.lookups(), vec!["Atlantis".to_string()]);
        assert_eq!(params.search.as_deref(), Some("Boston"));
        assert_eq!(params.location, None);
    }

    #[test]
    fn test_any_distance_radii_differ() {
        assert_eq!(geocoded_radius_km(10.0), 50.0);
        assert_relative_eq!(device_radius_km(10.0), 24.1);
        assert_ne!(geocoded_radius_km(10.0), device_radius_km(10.0));
    }

    #[test]
    fn test_radius_rounding() {
        assert_relative_eq!(geocoded_radius_km(0.5), 0.8);
        assert_relative_eq!(device_radius_km(0.5), 0.8);
        assert_relative_eq!(geocoded_radius_km(3.0), 4.8);
        assert_relative_eq!(device_radius_km(7.5), 12.1);
    }

    #[test]
    fn test_query_string_shape() {
        let mut state = state();
        state.query = "tacos".to_string();
        state.filters.price_range = PriceRange::new(1, 2).unwrap();
        let resolved = ResolvedCoordinates {
            coords: Coordinates::new(1.5, -2.5),
            source: CoordinateSource::GeocodedLocation("Austin, TX".to_string()),
        };

        let params = assemble(&state, Some(&resolved));
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["search"], "tacos");
        assert_eq!(value["price_range"], "1,2");
        assert_eq!(value["location"], "Austin, TX");
        assert_eq!(value["radius_km"], 50.0);
    }
}
