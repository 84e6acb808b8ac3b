use std::io;
use std::net::SocketAddr;
use std::time::Instant;

use filmloc_catalog::Catalog;
use filmloc_geocode::NominatimClient;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use filmmap::config::{Command, Config, load_config};
use filmmap::{
    AppState, LeafletRenderer, MapRenderer, compose, load_boundaries, parse_year, prompt_year,
    router,
};

const SKIPPED_LINES_LOGGED: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    if !config.unknown_args.is_empty() {
        warn!("ignoring unknown arguments: {:?}", config.unknown_args);
    }

    match config.command {
        Command::Build => build_map(config).await,
        Command::Serve => serve(config).await,
    }
}

async fn build_map(config: Config) -> anyhow::Result<()> {
    let year = match config.year.as_deref() {
        Some(raw) => parse_year(raw)?,
        None => prompt_year(io::stdin().lock(), io::stdout())?,
    };

    let catalog = load_catalog(&config)?;
    let by_year = catalog.locations_for_year(year);
    let counts = catalog.country_counts();
    info!(
        "{} locations in {year}, {} countries overall",
        by_year.len(),
        counts.len()
    );

    let boundaries = load_boundaries(&config.world_path)?;
    info!(
        "loaded {} boundaries from {}",
        boundaries.features.len(),
        config.world_path.display()
    );

    info!(
        "geocoding via {} at {} req/s",
        config.geocoder.base_url, config.geocoder.requests_per_sec
    );
    let geocoder = NominatimClient::new(config.geocoder.clone())?;
    let map = compose(year, &by_year, &counts, boundaries, &geocoder).await;
    if !map.unresolved.is_empty() {
        warn!("{} locations could not be placed", map.unresolved.len());
    }

    LeafletRenderer.render(&map, &config.output_path)?;
    info!("map written to {}", config.output_path.display());
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("binding to {}:{}", config.host, config.port);
    if config.disable_cache {
        info!("cache headers disabled");
    }

    // Borrowed records and counts live for the whole process.
    let catalog: &'static Catalog = Box::leak(Box::new(load_catalog(&config)?));
    let count_start = Instant::now();
    let state = AppState::new(catalog, config.disable_cache);
    info!(
        "{} country counts computed in {} ms",
        state.counts.len(),
        count_start.elapsed().as_millis()
    );

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    info!(
        "using catalog at {} (mode: {:?})",
        config.catalog_path.display(),
        config.load_mode
    );
    let start = Instant::now();
    let catalog = Catalog::load_with_mode(&config.catalog_path, config.load_mode)?;
    info!(
        "{} records from {} lines loaded in {} ms",
        catalog.record_count(),
        catalog.line_count(),
        start.elapsed().as_millis()
    );

    let skipped = catalog.skipped();
    if !skipped.is_empty() {
        warn!("skipped {} malformed lines", skipped.len());
        for line in skipped.iter().take(SKIPPED_LINES_LOGGED) {
            debug!("line {}: {}", line.line, line.reason);
        }
    }
    Ok(catalog)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
}
