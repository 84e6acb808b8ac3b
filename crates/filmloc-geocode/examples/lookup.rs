use std::env;

use anyhow::{Context, Result, bail};
use filmloc_geocode::{NominatimClient, NominatimConfig, ladder, resolve};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let place = args
        .next()
        .context("usage: cargo run -p filmloc-geocode --example lookup -- \"<place>\"")?;
    if args.next().is_some() {
        bail!("too many arguments (quote the place name)");
    }

    println!("Place: {place}");
    println!("Ladder:");
    for (source, query) in ladder(&place) {
        println!("  {:<28} {:?}", format!("{source:?}"), query);
    }

    let client = NominatimClient::new(NominatimConfig::default())?;
    match resolve(&client, &place).await {
        Some(found) => println!(
            "\nResolved {:?} [{:?}] -> {}",
            found.query, found.source, found.coordinates
        ),
        None => println!("\nNot found"),
    }

    Ok(())
}
