//! List view: one card per business

use crate::config::Config;
use crate::error::Result;
use crate::model::Business;
use crate::render::{rating_label, Renderer, ResultView};

/// List renderer - one multi-line card per business
pub struct ListRenderer;

impl ListRenderer {
    fn card(business: &Business, view: &ResultView<'_>, config: &Config) -> Result<String> {
        let mut card = String::new();

        let cursor = if view.is_selected(business.id) { ">" } else { " " };
        let heart = if view.is_favorite(business.id) { "♥" } else { "♡" };
        let featured = if business.is_featured { "  [featured]" } else { "" };
        card.push_str(&format!("{} {} {}{}\n", cursor, heart, business.name, featured));

        let mut headline = Vec::new();
        if let Some(category) = &business.category {
            headline.push(category.clone());
        }
        headline.push(format!("★ {}", rating_label(business)));
        card.push_str(&format!("    {}\n", headline.join(" · ")));

        let address = business.full_address();
        if !address.is_empty() {
            card.push_str(&format!("    {}\n", address));
        }

        let mut status = vec![if business.is_open { "Open now" } else { "Closed" }.to_string()];
        if let Some(price) = business.price_label() {
            status.push(price);
        }
        if let Some(distance) = &business.distance {
            status.push(distance.to_string());
        }
        card.push_str(&format!("    {}\n", status.join(" · ")));

        if !business.tags.is_empty() {
            let tags: Vec<_> = business.tags.iter().map(|t| format!("#{}", t)).collect();
            card.push_str(&format!("    {}\n", tags.join(" ")));
        }

        if let Some(coords) = business.coordinates() {
            card.push_str(&format!(
                "    {}\n",
                config.format_url(None, coords.latitude, coords.longitude)?
            ));
        }

        Ok(card)
    }
}

impl Renderer for ListRenderer {
    fn name(&self) -> &str {
        "list"
    }

    fn description(&self) -> &str {
        "One card per business"
    }

    fn render(&self, view: &ResultView<'_>, config: &Config) -> Result<String> {
        if view.results.is_empty() {
            return Ok("No businesses found.\n".to_string());
        }

        let cards = view
            .results
            .iter()
            .map(|business| Self::card(business, view, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(cards.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::business;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_list_card() {
        let results = vec![business(
            7,
            "Blue Door Cafe",
            json!({
                "category": {"name": "Cafes"},
                "rating": 4.6,
                "reviews_count": 128,
                "address": "12 Elm St",
                "city": "Boston",
                "latitude": 42.35,
                "longitude": -71.06,
                "is_open": true,
                "price_range": 2,
                "distance": 0.4,
                "tags": ["wifi"]
            }),
        )];
        let favorites = HashSet::from([7]);
        let view = ResultView::new(&results, &favorites).with_selected(Some(7));

        let output = ListRenderer.render(&view, &Config::default()).unwrap();

        assert!(output.starts_with("> ♥ Blue Door Cafe\n"));
        assert!(output.contains("Cafes · ★ 4.6 (128 reviews)"));
        assert!(output.contains("12 Elm St, Boston"));
        assert!(output.contains("Open now · $$ · 400 m"));
        assert!(output.contains("#wifi"));
        assert!(output.contains("openstreetmap.org/?mlat=42.35&mlon=-71.06"));
    }

    #[test]
    fn test_closed_unfavorited() {
        let results = vec![business(1, "Kiln", json!({"is_featured": true}))];
        let favorites = HashSet::new();
        let output = ListRenderer
            .render(&ResultView::new(&results, &favorites), &Config::default())
            .unwrap();

        assert!(output.starts_with("  ♡ Kiln  [featured]\n"));
        assert!(output.contains("Closed"));
        assert!(!output.contains("http"));
    }

    #[test]
    fn test_empty_results() {
        let favorites = HashSet::new();
        let output = ListRenderer
            .render(&ResultView::new(&[], &favorites), &Config::default())
            .unwrap();
        assert_eq!(output, "No businesses found.\n");
    }
}
