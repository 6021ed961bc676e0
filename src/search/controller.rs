//! Search state controller
//!
//! The single owner of a search page's state. Every change to the query,
//! location, device position, filters or sort order goes through here and
//! triggers one fetch against the business source.
//!
//! Fetches are tagged with a generation number. A response is applied only if
//! it belongs to the most recently issued fetch, so a slow earlier request can
//! never overwrite newer results.

use crate::api::BusinessSource;
use crate::error::Result;
use crate::geo::Geocoder;
use crate::model::{Business, BusinessPage, Coordinates};
use crate::search::filters::{Filters, SortOption};
use crate::search::params::{build_params, ResolvedCoordinates, SearchParams};
use crate::search::state::SearchState;
use tracing::{debug, info, warn};

/// A user action on the search page
#[derive(Debug, Clone, PartialEq)]
pub enum SearchChange {
    Query(String),
    Location(String),
    UserCoords(Option<Coordinates>),
    Filters(Filters),
    Sort(SortOption),
    ResetFilters,
    ClearAll,
}

/// A fetch that has been issued but not yet applied
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSearch {
    pub generation: u64,
    pub params: SearchParams,
    pub resolved: Option<ResolvedCoordinates>,
}

/// Owns [`SearchState`] and keeps its results in sync with the backend
#[derive(Debug)]
pub struct SearchController<G, S> {
    state: SearchState,
    geocoder: G,
    source: S,
    generation: u64,
    last_params: Option<SearchParams>,
    resolved: Option<ResolvedCoordinates>,
}

impl<G: Geocoder, S: BusinessSource> SearchController<G, S> {
    pub fn new(geocoder: G, source: S) -> Self {
        Self::with_state(SearchState::default(), geocoder, source)
    }

    /// Controller seeded with existing state (e.g. from URL parameters)
    pub fn with_state(state: SearchState, geocoder: G, source: S) -> Self {
        Self {
            state,
            geocoder,
            source,
            generation: 0,
            last_params: None,
            resolved: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn into_state(self) -> SearchState {
        self.state
    }

    pub fn results(&self) -> &[Business] {
        &self.state.results
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Parameters of the last issued fetch
    pub fn last_params(&self) -> Option<&SearchParams> {
        self.last_params.as_ref()
    }

    /// Coordinates resolved for the last issued fetch
    pub fn resolved(&self) -> Option<&ResolvedCoordinates> {
        self.resolved.as_ref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.state.location = location.into();
    }

    pub fn set_user_coords(&mut self, coords: Option<Coordinates>) {
        self.state.user_coords = coords;
    }

    /// Replace the filter set; out-of-range values are rejected
    pub fn set_filters(&mut self, filters: Filters) -> Result<()> {
        filters.validate()?;
        self.state.filters = filters;
        Ok(())
    }

    pub fn set_sort(&mut self, sort_by: SortOption) {
        self.state.sort_by = sort_by;
    }

    /// Restore filters to their defaults
    pub fn reset_filters(&mut self) {
        self.state.reset_filters();
    }

    /// Clear filters, query, location, device position and sort order
    pub fn clear_all(&mut self) {
        self.state.clear_all();
    }

    /// Apply a user action and refetch
    pub async fn apply(&mut self, change: SearchChange) -> Result<&SearchState> {
        match change {
            SearchChange::Query(query) => self.set_query(query),
            SearchChange::Location(location) => self.set_location(location),
            SearchChange::UserCoords(coords) => self.set_user_coords(coords),
            SearchChange::Filters(filters) => self.set_filters(filters)?,
            SearchChange::Sort(sort_by) => self.set_sort(sort_by),
            SearchChange::ResetFilters => self.reset_filters(),
            SearchChange::ClearAll => self.clear_all(),
        }
        Ok(self.search().await)
    }

    /// Parameters the current state would send, without issuing a fetch
    pub async fn params(&self) -> SearchParams {
        build_params(&self.state, &self.geocoder).await.0
    }

    /// Issue a fetch: bump the generation, mark loading and assemble params
    pub async fn begin(&mut self) -> PendingSearch {
        self.generation += 1;
        self.state.loading = true;
        self.state.error = None;

        let (params, resolved) = build_params(&self.state, &self.geocoder).await;
        self.last_params = Some(params.clone());
        self.resolved.clone_from(&resolved);

        PendingSearch {
            generation: self.generation,
            params,
            resolved,
        }
    }

    /// Apply the outcome of a fetch
    ///
    /// Returns false (and changes nothing) when a newer fetch has been issued
    /// since `generation`.
    pub fn finish(&mut self, generation: u64, outcome: Result<BusinessPage>) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                "dropping stale search response"
            );
            return false;
        }

        match outcome {
            Ok(page) => {
                info!(count = page.data.len(), total = page.total, "search results applied");
                self.state.total = page.total;
                self.state.results = page.data;
                self.state.error = None;
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                self.state.results.clear();
                self.state.total = 0;
                self.state.error = Some(format!("Failed to load businesses: {}", e));
            }
        }
        self.state.loading = false;
        true
    }

    /// Fetch results for the current state
    pub async fn search(&mut self) -> &SearchState {
        let pending = self.begin().await;
        let outcome = self.source.search(&pending.params).await;
        self.finish(pending.generation, outcome);
        &self.state
    }
}
