use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use geojson::{FeatureCollection, GeoJson};
use serde::Serialize;
use thiserror::Error;

use crate::compose::ComposedMap;

pub const TIER_LAYER_NAME: &str = "Movies(red> 20000, 3000 <orange <20000, green < 3000)";
pub const MARKER_LAYER_NAME: &str = "Locations of movies in given year";

const TEMPLATE: &str = include_str!("../templates/map.html");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read boundaries {path}: {source}")]
    ReadBoundaries { path: PathBuf, source: io::Error },
    #[error("invalid boundary geojson: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("boundary document is not a feature collection")]
    NotACollection,
    #[error("failed to encode map data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Writes a [`ComposedMap`] to a single artifact.
pub trait MapRenderer {
    fn render(&self, map: &ComposedMap, path: &Path) -> Result<(), RenderError>;
}

/// Read the country boundaries; a leading byte-order mark is ignored.
pub fn load_boundaries(path: impl AsRef<Path>) -> Result<FeatureCollection, RenderError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RenderError::ReadBoundaries {
        path: path.to_path_buf(),
        source,
    })?;
    parse_boundaries(&text)
}

pub fn parse_boundaries(text: &str) -> Result<FeatureCollection, RenderError> {
    match text.trim_start_matches('\u{feff}').parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(RenderError::NotACollection),
    }
}

#[derive(Serialize)]
struct MarkerData<'a> {
    lat: f64,
    lon: f64,
    label: &'a str,
}

/// Standalone Leaflet page: a styled boundary layer, a marker layer and a
/// layer control.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeafletRenderer;

impl LeafletRenderer {
    pub fn to_html(&self, map: &ComposedMap) -> Result<String, RenderError> {
        let markers: Vec<MarkerData<'_>> = map
            .markers
            .iter()
            .map(|m| MarkerData {
                lat: m.coordinates.latitude,
                lon: m.coordinates.longitude,
                label: &m.label,
            })
            .collect();

        Ok(TEMPLATE
            .replace("{{YEAR}}", &map.year.to_string())
            .replace("{{CENTER_LAT}}", &map.center.latitude.to_string())
            .replace("{{CENTER_LON}}", &map.center.longitude.to_string())
            .replace("{{ZOOM}}", &map.zoom.to_string())
            .replace("{{TIER_LAYER}}", &script_json(&TIER_LAYER_NAME)?)
            .replace("{{MARKER_LAYER}}", &script_json(&MARKER_LAYER_NAME)?)
            .replace("{{MARKERS}}", &script_json(&markers)?)
            .replace("{{BOUNDARIES}}", &script_json(&map.boundaries)?))
    }
}

impl MapRenderer for LeafletRenderer {
    fn render(&self, map: &ComposedMap, path: &Path) -> Result<(), RenderError> {
        let html = self.to_html(map)?;
        fs::write(path, html).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// JSON safe to inline in a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
