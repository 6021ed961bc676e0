//! Search filters and sort order

use crate::constants::search::{
    ALL_CATEGORIES, MAX_DISTANCE_MILES, MAX_PRICE_TIER, MAX_RATING, MIN_DISTANCE_MILES,
    MIN_PRICE_TIER,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result ordering requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Relevance,
    Rating,
    Distance,
    Reviews,
    Newest,
    Name,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Rating => "rating",
            Self::Distance => "distance",
            Self::Reviews => "reviews",
            Self::Newest => "newest",
            Self::Name => "name",
        }
    }

    pub fn all() -> [Self; 6] {
        [
            Self::Relevance,
            Self::Rating,
            Self::Distance,
            Self::Reviews,
            Self::Newest,
            Self::Name,
        ]
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "rating" => Ok(Self::Rating),
            "distance" => Ok(Self::Distance),
            "reviews" => Ok(Self::Reviews),
            "newest" => Ok(Self::Newest),
            "name" => Ok(Self::Name),
            _ => Err(format!("Unknown sort option: {}", s)),
        }
    }
}

/// Inclusive price tier range, `1 <= lo <= hi <= 4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; 2]", into = "[u8; 2]")]
pub struct PriceRange {
    lo: u8,
    hi: u8,
}

impl PriceRange {
    pub const FULL: Self = Self {
        lo: MIN_PRICE_TIER,
        hi: MAX_PRICE_TIER,
    };

    pub fn new(lo: u8, hi: u8) -> Result<Self> {
        let tiers = MIN_PRICE_TIER..=MAX_PRICE_TIER;
        if !tiers.contains(&lo) || !tiers.contains(&hi) {
            return Err(Error::InvalidFilter(format!(
                "Price tiers must be between {} and {}, got [{}, {}]",
                MIN_PRICE_TIER, MAX_PRICE_TIER, lo, hi
            )));
        }
        if lo > hi {
            return Err(Error::InvalidFilter(format!(
                "Price range lower bound {} exceeds upper bound {}",
                lo, hi
            )));
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(self) -> u8 {
        self.lo
    }

    pub fn hi(self) -> u8 {
        self.hi
    }

    /// True for `[1,4]`, the "no price filter" sentinel
    pub fn is_full(self) -> bool {
        self == Self::FULL
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lo, self.hi)
    }
}

impl FromStr for PriceRange {
    type Err = Error;

    /// Accepts "2,3", "2-3" or a single tier "2"
    fn from_str(s: &str) -> Result<Self> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u8>()
                .map_err(|_| Error::InvalidFilter(format!("Invalid price range: {}", s)))
        };
        match s.split_once([',', '-']) {
            Some((lo, hi)) => Self::new(parse(lo)?, parse(hi)?),
            None => {
                let tier = parse(s)?;
                Self::new(tier, tier)
            }
        }
    }
}

impl TryFrom<[u8; 2]> for PriceRange {
    type Error = Error;

    fn try_from([lo, hi]: [u8; 2]) -> Result<Self> {
        Self::new(lo, hi)
    }
}

impl From<PriceRange> for [u8; 2] {
    fn from(range: PriceRange) -> Self {
        [range.lo, range.hi]
    }
}

/// Narrowing applied on top of the text query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    /// Category name, or the "All Categories" sentinel
    pub category: String,
    /// Minimum rating, 0 (any) to 5
    pub min_rating: f64,
    /// Miles, 0.5 to 10; 10 means any distance
    pub max_distance: f64,
    pub open_now: bool,
    pub price_range: PriceRange,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            min_rating: 0.0,
            max_distance: MAX_DISTANCE_MILES,
            open_now: false,
            price_range: PriceRange::FULL,
        }
    }
}

impl Filters {
    /// Restore every filter to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Category to send, `None` for the sentinel or a blank value
    pub fn category_filter(&self) -> Option<&str> {
        let category = self.category.trim();
        (!category.is_empty() && category != ALL_CATEGORIES).then_some(category)
    }

    /// Whether the distance slider sits on "any distance"
    pub fn is_any_distance(&self) -> bool {
        self.max_distance >= MAX_DISTANCE_MILES
    }

    /// Number of filters that differ from their defaults
    pub fn active_count(&self) -> usize {
        [
            self.category_filter().is_some(),
            self.min_rating > 0.0,
            !self.is_any_distance(),
            self.open_now,
            !self.price_range.is_full(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_RATING).contains(&self.min_rating) {
            return Err(Error::InvalidFilter(format!(
                "Minimum rating must be between 0 and {}, got {}",
                MAX_RATING, self.min_rating
            )));
        }
        if !(MIN_DISTANCE_MILES..=MAX_DISTANCE_MILES).contains(&self.max_distance) {
            return Err(Error::InvalidFilter(format!(
                "Distance must be between {} and {} miles, got {}",
                MIN_DISTANCE_MILES, MAX_DISTANCE_MILES, self.max_distance
            )));
        }
        Ok(())
    }
}
