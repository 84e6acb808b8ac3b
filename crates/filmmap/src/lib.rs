pub mod compose;
pub mod config;
pub mod handlers;
pub mod prompt;
pub mod render;

pub use compose::{ComposedMap, MAP_CENTER, MAP_ZOOM, Marker, compose, marker_label, style_boundaries};
pub use handlers::{AppState, router};
pub use prompt::{YearInputError, parse_year, prompt_year};
pub use render::{LeafletRenderer, MapRenderer, RenderError, load_boundaries, parse_boundaries};
