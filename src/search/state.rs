//! Search page state
//!
//! Seeded from URL parameters when a search page opens, mutated by user
//! actions, and holding the last applied result list.

use crate::error::{Error, Result};
use crate::model::{Business, Coordinates};
use crate::search::filters::{Filters, PriceRange, SortOption};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::warn;

/// Everything the search page knows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub query: String,
    pub location: String,
    /// Device position, set by "near me"
    pub user_coords: Option<Coordinates>,
    pub filters: Filters,
    pub sort_by: SortOption,
    pub results: Vec<Business>,
    /// Total matches reported by the backend for the last applied fetch
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl SearchState {
    /// Seed state from a URL query string such as
    /// `q=pizza&location=Boston&category=Food&open_now=true`
    ///
    /// Unknown keys are ignored; malformed values are logged and skipped.
    pub fn from_query_string(query_string: &str) -> Self {
        let mut state = Self::default();
        let mut lat = None;
        let mut lng = None;

        for (key, value) in parse_pairs(query_string) {
            let value = value.as_ref();
            match key.as_ref() {
                "q" | "query" | "search" => state.query = value.to_string(),
                "location" => state.location = value.to_string(),
                "category" if !value.is_empty() => state.filters.category = value.to_string(),
                "min_rating" => apply(&mut state.filters.min_rating, &key, value),
                "max_distance" => apply(&mut state.filters.max_distance, &key, value),
                "open_now" | "is_open" => {
                    state.filters.open_now = matches!(value, "1" | "true" | "yes" | "on");
                }
                "price_range" => apply(&mut state.filters.price_range, &key, value),
                "sort" | "sort_by" => apply(&mut state.sort_by, &key, value),
                "lat" | "latitude" => lat = value.parse::<f64>().ok(),
                "lng" | "lon" | "longitude" => lng = value.parse::<f64>().ok(),
                _ => {}
            }
        }

        if let (Some(lat), Some(lng)) = (lat, lng) {
            let coords = Coordinates::new(lat, lng);
            if coords.validate().is_ok() {
                state.user_coords = Some(coords);
            }
        }

        if state.filters.validate().is_err() {
            warn!("filters from URL out of range, using defaults");
            state.filters.reset();
        }

        state
    }

    /// Shareable query string for the current search intent
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        let defaults = Filters::default();

        if !self.query.trim().is_empty() {
            pairs.push(("q", self.query.trim().to_string()));
        }
        if !self.location.trim().is_empty() {
            pairs.push(("location", self.location.trim().to_string()));
        }
        if let Some(category) = self.filters.category_filter() {
            pairs.push(("category", category.to_string()));
        }
        if self.filters.min_rating != defaults.min_rating {
            pairs.push(("min_rating", self.filters.min_rating.to_string()));
        }
        if self.filters.max_distance != defaults.max_distance {
            pairs.push(("max_distance", self.filters.max_distance.to_string()));
        }
        if self.filters.open_now {
            pairs.push(("open_now", "true".to_string()));
        }
        if !self.filters.price_range.is_full() {
            pairs.push(("price_range", self.filters.price_range.to_string()));
        }
        if self.sort_by != SortOption::Relevance {
            pairs.push(("sort_by", self.sort_by.to_string()));
        }
        if let Some(coords) = self.user_coords {
            pairs.push(("lat", coords.latitude.to_string()));
            pairs.push(("lng", coords.longitude.to_string()));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Restore filters to their defaults, keeping query, location and sort
    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    /// Return to the initial page state
    pub fn clear_all(&mut self) {
        self.filters.reset();
        self.query.clear();
        self.location.clear();
        self.user_coords = None;
        self.sort_by = SortOption::default();
    }

    /// Whether the search is anchored to the device position
    pub fn is_near_me(&self) -> bool {
        self.user_coords.is_some()
    }
}

/// Split `a=1&b=two+words` into decoded pairs
fn parse_pairs(query_string: &str) -> impl Iterator<Item = (Cow<'_, str>, Cow<'_, str>)> {
    query_string
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
}

fn decode(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        return Cow::Owned(
            urlencoding::decode(&spaced)
                .map(Cow::into_owned)
                .unwrap_or(spaced),
        );
    }
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Parse `value` into `slot`, logging and keeping the default on failure
fn apply<T>(slot: &mut T, key: &str, value: &str)
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(%key, %value, error = %e, "ignoring URL parameter"),
    }
}

/// Parse a `lat,lng` pair as typed on the command line
pub fn parse_coordinates(text: &str) -> Result<Coordinates> {
    let (lat, lng) = text
        .split_once(',')
        .ok_or_else(|| Error::InvalidCoordinates(format!("Expected 'lat,lng', got '{}'", text)))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidCoordinates(format!("Invalid number: {}", part.trim())))
    };
    let coords = Coordinates::new(parse(lat)?, parse(lng)?);
    coords.validate()?;
    Ok(coords)
}
