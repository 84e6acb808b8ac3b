use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use filmloc_catalog::{Catalog, LoadMode};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .context("usage: cargo run -p filmloc-catalog --example stats -- <locations.list> [year]")?;
    let year: Option<i32> = args
        .next()
        .map(|y| y.parse().context("year should be an integer"))
        .transpose()?;

    let catalog = Catalog::load_with_mode(&path, LoadMode::Mmap)
        .with_context(|| format!("loading catalog from {}", path.display()))?;
    let counts = catalog.country_counts();

    println!("Catalog      : {}", path.display());
    println!("Lines        : {}", catalog.line_count());
    println!("Records      : {}", catalog.record_count());
    println!("Skipped lines: {}", catalog.skipped().len());
    println!("Countries    : {}", counts.len());

    let mut top: Vec<(&str, u64)> = counts.iter().map(|(k, v)| (*k, *v)).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    println!("\nTop countries:");
    for (country, count) in top.iter().take(10) {
        println!("  {count:>8}  {country}");
    }

    if let Some(year) = year {
        let by_year = catalog.locations_for_year(year);
        let titles: usize = by_year.values().map(Vec::len).sum();
        println!(
            "\n{year}: {titles} titles across {} locations",
            by_year.len()
        );
    }

    Ok(())
}
