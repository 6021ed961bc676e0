//! Map view model
//!
//! Holds one marker per result that has coordinates, the viewport, and which
//! popup is open. Rendered as a GeoJSON `FeatureCollection` for any map
//! frontend (Leaflet, MapLibre) to draw over OpenStreetMap tiles.
//!
//! Viewport rules:
//! - a new result set fits the viewport to the bounds of all markers
//! - an empty result set resets to the default centre and zoom
//! - selecting a business opens its popup and pans to it

use crate::config::Config;
use crate::constants::map::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG, DEFAULT_ZOOM, SELECTED_ZOOM};
use crate::error::Result;
use crate::model::{Business, Coordinates};
use crate::render::{Renderer, ResultView, ViewEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Marker colour, chosen featured > open > closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerColor {
    Featured,
    Open,
    Closed,
}

impl MarkerColor {
    pub fn for_business(business: &Business) -> Self {
        if business.is_featured {
            Self::Featured
        } else if business.is_open {
            Self::Open
        } else {
            Self::Closed
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Featured => "#f59e0b",
            Self::Open => "#10b981",
            Self::Closed => "#6b7280",
        }
    }
}

/// One business on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: u64,
    pub name: String,
    pub coords: Coordinates,
    pub color: MarkerColor,
    /// Client-side route opened from the popup link
    pub href: String,
    pub favorite: bool,
}

/// What the map is showing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    /// Fit to these bounds
    Bounds {
        south: f64,
        west: f64,
        north: f64,
        east: f64,
    },
    /// Centre on a point at a zoom level
    Center { center: Coordinates, zoom: u8 },
}

impl Viewport {
    pub fn default_center() -> Self {
        Self::Center {
            center: Coordinates::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG),
            zoom: DEFAULT_ZOOM,
        }
    }

    /// Smallest bounds containing every marker; default centre when empty
    pub fn fit(markers: &[Marker]) -> Self {
        let mut coords = markers.iter().map(|m| m.coords);
        let Some(first) = coords.next() else {
            return Self::default_center();
        };

        let init = (first.latitude, first.longitude, first.latitude, first.longitude);
        let (south, west, north, east) = coords.fold(init, |(s, w, n, e), c| {
            (
                s.min(c.latitude),
                w.min(c.longitude),
                n.max(c.latitude),
                e.max(c.longitude),
            )
        });
        Self::Bounds {
            south,
            west,
            north,
            east,
        }
    }
}

/// Map state for one result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    markers: Vec<Marker>,
    viewport: Viewport,
    open_popup: Option<u64>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            viewport: Viewport::default_center(),
            open_popup: None,
        }
    }
}

impl MapView {
    /// Build markers for the view's results and apply its selection
    pub fn from_view(view: &ResultView<'_>) -> Self {
        let mut map = Self::default();
        map.set_results(view);
        if let Some(id) = view.selected {
            map.select(id);
        }
        map
    }

    /// Replace all markers and refit the viewport
    ///
    /// Results without coordinates get no marker.
    pub fn set_results(&mut self, view: &ResultView<'_>) {
        self.markers = view
            .results
            .iter()
            .filter_map(|business| {
                business.coordinates().map(|coords| Marker {
                    id: business.id,
                    name: business.name.clone(),
                    coords,
                    color: MarkerColor::for_business(business),
                    href: business.href(),
                    favorite: view.is_favorite(business.id),
                })
            })
            .collect();
        self.viewport = Viewport::fit(&self.markers);
        self.open_popup = None;
        debug!(markers = self.markers.len(), "map results replaced");
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn open_popup(&self) -> Option<u64> {
        self.open_popup
    }

    fn marker(&self, id: u64) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Open the popup of `id` and pan to it; false if it has no marker
    pub fn select(&mut self, id: u64) -> bool {
        let Some(center) = self.marker(id).map(|m| m.coords) else {
            return false;
        };
        self.open_popup = Some(id);
        self.viewport = Viewport::Center {
            center,
            zoom: SELECTED_ZOOM,
        };
        true
    }

    /// Event for a click on the marker of `id`
    pub fn click(&self, id: u64) -> Option<ViewEvent> {
        self.marker(id).map(|m| ViewEvent::BusinessSelected(m.id))
    }

    /// Event for the link inside the open popup
    pub fn follow_popup_link(&self) -> Option<ViewEvent> {
        self.open_popup
            .and_then(|id| self.marker(id))
            .map(|m| ViewEvent::Navigate(m.href.clone()))
    }

    /// GeoJSON `FeatureCollection` with the viewport as a foreign member
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .markers
            .iter()
            .map(|m| {
                json!({
                    "type": "Feature",
                    "id": m.id,
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.coords.longitude, m.coords.latitude]
                    },
                    "properties": {
                        "name": m.name,
                        "href": m.href,
                        "color": m.color,
                        "marker-color": m.color.hex(),
                        "favorite": m.favorite,
                        "popup_open": self.open_popup == Some(m.id)
                    }
                })
            })
            .collect();

        let mut collection = json!({
            "type": "FeatureCollection",
            "features": features,
            "viewport": self.viewport,
        });
        if let Viewport::Bounds {
            south,
            west,
            north,
            east,
        } = self.viewport
        {
            collection["bbox"] = json!([west, south, east, north]);
        }
        collection
    }
}

/// Map renderer - GeoJSON of the map view
pub struct MapRenderer;

impl Renderer for MapRenderer {
    fn name(&self) -> &str {
        "map"
    }

    fn description(&self) -> &str {
        "GeoJSON markers and viewport"
    }

    fn render(&self, view: &ResultView<'_>, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(&MapView::from_view(view).to_geojson())?)
    }
}
