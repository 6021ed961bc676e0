//! Grid view: compact fixed-width rows

use crate::config::Config;
use crate::error::Result;
use crate::render::{truncate, Renderer, ResultView};

const NAME_WIDTH: usize = 28;
const CATEGORY_WIDTH: usize = 16;

/// Grid renderer - one aligned row per business
pub struct GridRenderer;

impl Renderer for GridRenderer {
    fn name(&self) -> &str {
        "grid"
    }

    fn description(&self) -> &str {
        "Compact cards in aligned columns"
    }

    fn render(&self, view: &ResultView<'_>, _config: &Config) -> Result<String> {
        if view.results.is_empty() {
            return Ok("No businesses found.\n".to_string());
        }

        let mut output = format!(
            "    {:<name$} {:<cat$} {:>6} {:<6} {:<5} {}\n",
            "NAME",
            "CATEGORY",
            "RATING",
            "STATUS",
            "PRICE",
            "DISTANCE",
            name = NAME_WIDTH,
            cat = CATEGORY_WIDTH,
        );

        for business in view.results {
            let cursor = if view.is_selected(business.id) { '>' } else { ' ' };
            let heart = if view.is_favorite(business.id) { '♥' } else { '♡' };
            let rating = if business.reviews_count == 0 {
                "-".to_string()
            } else {
                format!("{:.1}", business.rating)
            };

            let row = format!(
                "{} {} {:<name$} {:<cat$} {:>6} {:<6} {:<5} {}",
                cursor,
                heart,
                truncate(&business.name, NAME_WIDTH),
                truncate(business.category.as_deref().unwrap_or("-"), CATEGORY_WIDTH),
                rating,
                if business.is_open { "open" } else { "closed" },
                business.price_label().unwrap_or_default(),
                business
                    .distance
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                name = NAME_WIDTH,
                cat = CATEGORY_WIDTH,
            );
            output.push_str(row.trim_end());
            output.push('\n');
        }

        Ok(output)
    }
}
