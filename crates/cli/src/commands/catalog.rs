use anyhow::{Context, Result};
use cravey_core::demo_catalog;

pub fn run(json: bool) -> Result<()> {
    let catalog = demo_catalog();

    if json {
        let payload =
            serde_json::to_string_pretty(catalog.products()).context("serializing catalog")?;
        println!("{payload}");
        return Ok(());
    }

    for product in catalog.products() {
        let dietary = product.dietary_tags.iter().cloned().collect::<Vec<_>>().join(", ");
        let dietary = if dietary.is_empty() { "-".to_owned() } else { dietary };
        println!(
            "{:<22} {:<10} ${:>6}  spice {:>2}  pop {:>3}  [{dietary}]",
            product.name, product.category, product.price, product.spice_level,
            product.popularity_score
        );
    }

    Ok(())
}
