use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use filmloc_catalog::Catalog;
use filmmap::handlers::{AppState, router};

const FIXTURE: &str = include_str!("../../filmloc-catalog/tests/fixtures/locations.list");

fn make_app(disable_cache: bool) -> Router {
    let catalog: &'static Catalog = Box::leak(Box::new(Catalog::from_text(FIXTURE)));
    router(AppState::new(catalog, disable_cache))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap())
}

#[tokio::test]
async fn healthz_ok() {
    let response = make_app(false)
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body_bytes[..], b"ok");
}

#[tokio::test]
async fn year_endpoint_lists_locations() {
    let (status, body) = get_json(make_app(false), "/v1/years/1994").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 1994);
    assert_eq!(body["location_count"], 4);
    assert_eq!(body["title_count"], 5);
    assert_eq!(
        body["locations"]["Los Angeles, California, USA"],
        serde_json::json!(["\"Shore Leave\" ", "Desert Song "])
    );
}

#[tokio::test]
async fn unknown_year_is_empty() {
    let (status, body) = get_json(make_app(false), "/v1/years/2020").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location_count"], 0);
    assert_eq!(body["locations"], serde_json::json!({}));
}

#[tokio::test]
async fn year_endpoint_rejects_non_integers() {
    let (status, body) = get_json(make_app(false), "/v1/years/nineteen").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("Year should be an integer!")
    );
}

#[tokio::test]
async fn country_endpoint_reports_tier() {
    let (status, body) = get_json(make_app(false), "/v1/countries/United%20States").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country"], "United States");
    assert_eq!(body["count"], 4);
    assert_eq!(body["tier"], "A");

    let (_, body) = get_json(make_app(false), "/v1/countries/Atlantis").await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn cache_headers_follow_config() {
    let uri = "/v1/countries/France";
    let cached = make_app(false)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(cached.headers().contains_key(header::CACHE_CONTROL));

    let uncached = make_app(true)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(!uncached.headers().contains_key(header::CACHE_CONTROL));
}
