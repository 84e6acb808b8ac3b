use std::borrow::Cow;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use filmloc_catalog::{Catalog, count_for};
use filmloc_types::{CountryCountMap, Tier, YearLocationMap};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::prompt::parse_year;

#[derive(Clone)]
pub struct AppState {
    pub catalog: &'static Catalog,
    /// All-time counts, computed once at startup.
    pub counts: Arc<CountryCountMap<'static>>,
    pub disable_cache: bool,
}

impl AppState {
    pub fn new(catalog: &'static Catalog, disable_cache: bool) -> Self {
        Self {
            catalog,
            counts: Arc::new(catalog.country_counts()),
            disable_cache,
        }
    }
}

#[derive(Serialize)]
pub struct YearResponse<'a> {
    year: i32,
    location_count: usize,
    title_count: usize,
    locations: YearLocationMap<'a>,
}

#[derive(Serialize)]
pub struct CountryResponse {
    country: String,
    count: u64,
    tier: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/years/{year}", get(year))
        .route("/v1/countries/{country}", get(country))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn year(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    let year = parse_year(&raw).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let locations = state.catalog.locations_for_year(year);
    let title_count = locations.values().map(Vec::len).sum();
    debug!(year, locations = locations.len(), "year query");

    let response = YearResponse {
        year,
        location_count: locations.len(),
        title_count,
        locations,
    };
    Ok(cacheable(&state, Json(response)))
}

async fn country(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let count = count_for(&name, &state.counts);
    let response = CountryResponse {
        country: name,
        count,
        tier: Tier::for_count(count).to_string(),
    };
    cacheable(&state, Json(response))
}

fn cacheable(state: &AppState, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        ApiError::BadRequest(msg.into().into_owned())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
