//! JSON output

use crate::config::Config;
use crate::error::Result;
use crate::render::{Renderer, ResultView};

/// JSON renderer - the raw result list, pretty-printed
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Raw result list as JSON"
    }

    fn render(&self, view: &ResultView<'_>, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(view.results)?)
    }
}
