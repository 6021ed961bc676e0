//! Result renderers
//!
//! Every view is a pure function of the result list, the set of favorite ids
//! and the current selection. Views never fetch or mutate results; user
//! interaction is reported back as [`ViewEvent`]s.

pub mod grid;
pub mod json;
pub mod list;
pub mod map;

use crate::config::Config;
use crate::error::Result;
use crate::model::Business;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use map::{MapView, Marker, MarkerColor, Viewport};

/// Interaction reported by a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum ViewEvent {
    /// The favorite marker of a business was toggled
    FavoriteToggled(u64),
    /// A map marker was clicked
    BusinessSelected(u64),
    /// A popup link asked for client-side navigation
    Navigate(String),
}

/// Input shared by every view
#[derive(Debug, Clone, Copy)]
pub struct ResultView<'a> {
    pub results: &'a [Business],
    pub favorite_ids: &'a HashSet<u64>,
    pub selected: Option<u64>,
}

impl<'a> ResultView<'a> {
    pub fn new(results: &'a [Business], favorite_ids: &'a HashSet<u64>) -> Self {
        Self {
            results,
            favorite_ids,
            selected: None,
        }
    }

    pub fn with_selected(mut self, selected: Option<u64>) -> Self {
        self.selected = selected;
        self
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorite_ids.contains(&id)
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selected == Some(id)
    }

    /// Event for the favorite marker on a rendered business
    pub fn toggle_favorite(&self, id: u64) -> Option<ViewEvent> {
        self.results
            .iter()
            .any(|b| b.id == id)
            .then_some(ViewEvent::FavoriteToggled(id))
    }
}

/// The signed-in user's favorite business ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    ids: HashSet<u64>,
}

impl Favorites {
    pub fn from_businesses(businesses: &[Business]) -> Self {
        businesses.iter().map(|b| b.id).collect()
    }

    pub fn ids(&self) -> &HashSet<u64> {
        &self.ids
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Flip membership; returns whether `id` is now a favorite
    pub fn toggle(&mut self, id: u64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }
}

impl FromIterator<u64> for Favorites {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Information about a view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewInfo {
    pub name: String,
    pub description: String,
}

/// Trait for result views
pub trait Renderer: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Render the results; `config` supplies map link providers
    fn render(&self, view: &ResultView<'_>, config: &Config) -> Result<String>;
}

/// Get a renderer by name
pub fn get_renderer(name: &str) -> Option<Box<dyn Renderer>> {
    match name.to_lowercase().as_str() {
        "list" => Some(Box::new(list::ListRenderer)),
        "grid" => Some(Box::new(grid::GridRenderer)),
        "map" => Some(Box::new(map::MapRenderer)),
        "json" => Some(Box::new(json::JsonRenderer)),
        _ => None,
    }
}

/// List all available views
pub fn available_views() -> Vec<ViewInfo> {
    ["list", "grid", "map", "json"]
        .into_iter()
        .filter_map(get_renderer)
        .map(|r| ViewInfo {
            name: r.name().to_string(),
            description: r.description().to_string(),
        })
        .collect()
}

/// Cut `text` to at most `width` characters, marking the cut with '…'
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// "4.6 (128 reviews)", or "No reviews yet"
pub(crate) fn rating_label(business: &Business) -> String {
    match business.reviews_count {
        0 => "No reviews yet".to_string(),
        1 => format!("{:.1} (1 review)", business.rating),
        n => format!("{:.1} ({} reviews)", business.rating, n),
    }
}
