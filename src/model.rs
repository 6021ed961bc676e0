//! Directory read-models
//!
//! Shapes returned by the directory backend. The client treats every value
//! here as an immutable snapshot of one fetch.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Kind of business, which decides the detail sections shown for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Restaurant,
    Retail,
    Service,
    #[default]
    #[serde(other)]
    Other,
}

/// Optional detail section of a business page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySection {
    Menu,
    Products,
    Services,
    Offers,
    Hours,
    Reviews,
    Gallery,
}

impl BusinessType {
    /// Sections that apply to this kind of business, in display order
    pub fn sections(self) -> &'static [DisplaySection] {
        use DisplaySection::*;
        match self {
            Self::Restaurant => &[Menu, Offers, Hours, Gallery, Reviews],
            Self::Retail => &[Products, Offers, Hours, Gallery, Reviews],
            Self::Service => &[Services, Offers, Hours, Reviews],
            Self::Other => &[Offers, Hours, Reviews],
        }
    }

    pub fn has_section(self, section: DisplaySection) -> bool {
        self.sections().contains(&section)
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restaurant => write!(f, "restaurant"),
            Self::Retail => write!(f, "retail"),
            Self::Service => write!(f, "service"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl fmt::Display for DisplaySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Menu => "Menu",
            Self::Products => "Products",
            Self::Services => "Services",
            Self::Offers => "Offers",
            Self::Hours => "Hours",
            Self::Reviews => "Reviews",
            Self::Gallery => "Gallery",
        };
        write!(f, "{}", name)
    }
}

/// Distance as reported by the backend: preformatted text or kilometres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Distance {
    Km(f64),
    Text(String),
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Km(km) if *km < 1.0 => write!(f, "{:.0} m", km * 1000.0),
            Self::Km(km) => write!(f, "{:.1} km", km),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

/// A business in a search result list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "category_name")]
    pub category: Option<String>,
    #[serde(rename = "type", alias = "business_type", default)]
    pub business_type: BusinessType,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: f64,
    #[serde(alias = "reviews", alias = "review_count", default, deserialize_with = "lenient_u32")]
    pub reviews_count: u32,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub longitude: Option<f64>,
    #[serde(alias = "open", default, deserialize_with = "lenient_bool")]
    pub is_open: bool,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(alias = "featured", default, deserialize_with = "lenient_bool")]
    pub is_featured: bool,
    #[serde(alias = "price_tier", default, deserialize_with = "lenient_opt_u8")]
    pub price_range: Option<u8>,
    #[serde(alias = "image_url", default)]
    pub image: Option<String>,
    #[serde(default)]
    pub distance: Option<Distance>,
}

impl Business {
    /// Position, when the backend knows both coordinates
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    /// "address, city" with missing parts skipped
    pub fn full_address(&self) -> String {
        [self.address.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// "$" repeated per price tier
    pub fn price_label(&self) -> Option<String> {
        self.price_range
            .filter(|tier| *tier > 0)
            .map(|tier| "$".repeat(tier as usize))
    }

    /// Client-side route of the business detail page
    pub fn href(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.is_empty() => format!("/business/{}", slug),
            _ => format!("/business/{}", self.id),
        }
    }
}

/// Accepts `"Food"` or `{"name": "Food", ...}`
fn category_name<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Name(String),
        Object { name: String },
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Name(name) | Raw::Object { name } => name,
    }))
}

/// Decimal columns may arrive as JSON strings ("4.50")
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64(self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.and_then(NumberOrString::into_f64))
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

/// Non-negative whole number, or None
fn whole(n: f64) -> Option<u64> {
    (n.is_finite() && n >= 0.0).then(|| n.round() as u64)
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?
        .and_then(whole)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0))
}

fn lenient_opt_u8<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?
        .and_then(whole)
        .and_then(|n| u8::try_from(n).ok()))
}

/// Flags may arrive as `true`, `1`, `"1"` or `"true"`; null is false
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Bool(b)) => b,
        Some(Raw::Number(n)) => n != 0.0,
        Some(Raw::Text(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => false,
    })
}

/// A list of tags, a comma-separated string, or null
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<Option<String>>),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::List(tags)) => tags.into_iter().flatten().collect(),
        Some(Raw::Text(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect(),
        None => Vec::new(),
    })
}

/// A business category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// One page of business search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPage {
    pub data: Vec<Business>,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub total: u64,
}

fn first_page() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "id": 7,
            "name": "Blue Door Cafe",
            "slug": "blue-door-cafe",
            "category": {"id": 2, "name": "Cafes"},
            "type": "restaurant",
            "rating": 4.6,
            "reviews_count": 128,
            "address": "12 Elm St",
            "city": "Boston",
            "latitude": 42.35,
            "longitude": -71.06,
            "is_open": true,
            "tags": ["wifi", "vegan"],
            "is_featured": false,
            "price_range": 2,
            "distance": 0.4
        })
    }

    #[test]
    fn test_business_deserialize() {
        let business: Business = serde_json::from_value(sample()).unwrap();

        assert_eq!(business.id, 7);
        assert_eq!(business.category.as_deref(), Some("Cafes"));
        assert_eq!(business.business_type, BusinessType::Restaurant);
        assert_eq!(business.coordinates(), Some(Coordinates::new(42.35, -71.06)));
        assert_eq!(business.full_address(), "12 Elm St, Boston");
        assert_eq!(business.price_label().as_deref(), Some("$$"));
        assert_eq!(business.href(), "/business/blue-door-cafe");
        assert_eq!(business.distance.unwrap().to_string(), "400 m");
    }

    #[test]
    fn test_business_minimal_and_aliases() {
        let business: Business = serde_json::from_value(json!({
            "id": 3,
            "name": "Corner Store",
            "category": "Grocery",
            "type": "kiosk",
            "rating": "3.50",
            "latitude": "42.1",
            "longitude": null,
            "reviews": 4,
            "open": true,
            "featured": true,
            "distance": "1.2 mi"
        }))
        .unwrap();

        assert_eq!(business.category.as_deref(), Some("Grocery"));
        assert_eq!(business.business_type, BusinessType::Other);
        assert_eq!(business.reviews_count, 4);
        assert_eq!(business.rating, 3.5);
        assert_eq!(business.latitude, Some(42.1));
        assert!(business.is_open);
        assert!(business.is_featured);
        assert!(business.coordinates().is_none());
        assert_eq!(business.href(), "/business/3");
        assert_eq!(business.distance.unwrap().to_string(), "1.2 mi");

        let business: Business = serde_json::from_value(json!({
            "id": 4,
            "name": "Night Market",
            "reviews_count": null,
            "is_open": null,
            "is_featured": "1",
            "price_range": "2",
            "tags": null
        }))
        .unwrap();

        assert_eq!(business.reviews_count, 0);
        assert!(!business.is_open);
        assert!(business.is_featured);
        assert_eq!(business.price_range, Some(2));
        assert!(business.tags.is_empty());

        let business: Business = serde_json::from_value(json!({
            "id": 5,
            "name": "Hardware Hub",
            "reviews_count": "17",
            "is_open": 0,
            "price_range": null,
            "tags": "tools, garden"
        }))
        .unwrap();

        assert_eq!(business.reviews_count, 17);
        assert!(!business.is_open);
        assert_eq!(business.price_range, None);
        assert_eq!(business.tags, vec!["tools", "garden"]);
    }

    #[test]
    fn test_page_tolerates_null_fields() {
        let page: BusinessPage = serde_json::from_value(json!({
            "data": [
                {"id": 1, "name": "A", "is_open": null},
                {"id": 2, "name": "B", "reviews_count": null, "price_range": "3"}
            ]
        }))
        .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[1].price_range, Some(3));
    }

    #[test]
    fn test_sections_are_total() {
        for ty in [
            BusinessType::Restaurant,
            BusinessType::Retail,
            BusinessType::Service,
            BusinessType::Other,
        ] {
            assert!(ty.has_section(DisplaySection::Reviews));
            assert!(ty.has_section(DisplaySection::Hours));
        }
        assert!(BusinessType::Restaurant.has_section(DisplaySection::Menu));
        assert!(!BusinessType::Restaurant.has_section(DisplaySection::Products));
        assert!(BusinessType::Retail.has_section(DisplaySection::Products));
        assert!(BusinessType::Service.has_section(DisplaySection::Services));
        assert!(!BusinessType::Other.has_section(DisplaySection::Menu));
    }

    #[test]
    fn test_coordinates_validate() {
        assert!(Coordinates::new(42.0, -71.0).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, 181.0).validate().is_err());
    }

    #[test]
    fn test_page_defaults() {
        let page: BusinessPage = serde_json::from_value(json!({"data": []})).unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total, 0);
    }
}
