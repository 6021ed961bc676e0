//! Categories and business detail commands

use crate::cli::directory_client;
use crate::config::Config;
use crate::error::Result;
use crate::model::Business;
use crate::render::rating_label;
use clap::Args;

/// Categories command arguments
#[derive(Args)]
pub struct CategoriesArgs {
    /// Print raw JSON
    #[arg(long)]
    pub json: bool,
}

/// Show command arguments
#[derive(Args)]
pub struct ShowArgs {
    /// Business id or slug
    pub id: String,

    /// Print raw JSON
    #[arg(long)]
    pub json: bool,

    /// Map link provider (google, openstreetmap, apple)
    #[arg(long)]
    pub provider: Option<String>,
}

/// Run the categories command
pub async fn run_categories(args: CategoriesArgs) -> Result<()> {
    let config = Config::load()?;
    let (client, _) = directory_client(&config)?;
    let categories = client.categories().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    if categories.is_empty() {
        println!("No categories.");
        return Ok(());
    }
    for category in &categories {
        println!("{:>4}  {:<24} {}", category.id, category.name, category.slug);
    }
    Ok(())
}

/// Run the show command
pub async fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load()?;
    let (client, _) = directory_client(&config)?;
    let business = client.business(&args.id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&business)?);
        return Ok(());
    }

    print!("{}", describe(&business, &config, args.provider.as_deref())?);
    Ok(())
}

/// Detail text for one business, listing the sections its type carries
fn describe(business: &Business, config: &Config, provider: Option<&str>) -> Result<String> {
    let mut out = format!("{}\n", business.name);
    if let Some(category) = &business.category {
        out.push_str(&format!("Category: {}\n", category));
    }
    out.push_str(&format!("Type:     {}\n", business.business_type));
    out.push_str(&format!("Rating:   {}\n", rating_label(business)));

    let address = business.full_address();
    if !address.is_empty() {
        out.push_str(&format!("Address:  {}\n", address));
    }
    out.push_str(&format!(
        "Status:   {}\n",
        if business.is_open { "Open now" } else { "Closed" }
    ));
    if let Some(price) = business.price_label() {
        out.push_str(&format!("Price:    {}\n", price));
    }

    let sections: Vec<_> = business
        .business_type
        .sections()
        .iter()
        .map(ToString::to_string)
        .collect();
    out.push_str(&format!("Sections: {}\n", sections.join(", ")));
    out.push_str(&format!("Page:     {}\n", business.href()));

    if let Some(coords) = business.coordinates() {
        out.push_str(&format!(
            "Map:      {}\n",
            config.format_url(provider, coords.latitude, coords.longitude)?
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_lists_type_sections() {
        let business: Business = serde_json::from_value(json!({
            "id": 4,
            "name": "Kiln Hardware",
            "slug": "kiln-hardware",
            "type": "retail",
            "latitude": 40.0,
            "longitude": -75.0
        }))
        .unwrap();

        let text = describe(&business, &Config::default(), Some("google")).unwrap();

        assert!(text.contains("Type:     retail"));
        assert!(text.contains("Sections: Products, Offers, Hours, Gallery, Reviews"));
        assert!(text.contains("Page:     /business/kiln-hardware"));
        assert!(text.contains("Map:      https://www.google.com/maps"));
    }

    #[test]
    fn test_describe_unknown_provider() {
        let business: Business =
            serde_json::from_value(json!({"id": 1, "name": "A", "latitude": 1.0, "longitude": 2.0}))
                .unwrap();
        assert!(describe(&business, &Config::default(), Some("bing")).is_err());
    }
}
