//! HTTP API routes
//!
//! A local JSON API over the search pipeline so browser frontends can share
//! the same parameter assembly, geocode cache and location adapter.

use crate::error::Error;
use crate::geo::{GeoLocation, Geocoder, LocationOutcome};
use crate::model::{Business, Category};
use crate::render::{available_views, ViewInfo};
use crate::search::{ResolvedCoordinates, SearchController, SearchParams, SearchState};
use crate::server::state::AppState;

use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/search", get(search_handler))
        .route("/api/geocode", get(geocode_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/location", get(location_handler))
        .route("/api/views", get(views_handler))
        .route("/api/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn bad_request(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::InvalidFilter(_) => (StatusCode::BAD_REQUEST, "INVALID_FILTER"),
            Error::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Error::Api { .. } | Error::Http(_) | Error::Json(_) => {
                (StatusCode::BAD_GATEWAY, "DIRECTORY_ERROR")
            }
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            status,
        }
    }
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Parameters sent to the directory
    pub params: SearchParams,
    /// Where the coordinates came from, if any were resolved
    pub resolved: Option<ResolvedCoordinates>,
    pub results: Vec<Business>,
    pub total: u64,
    /// Set when the directory request failed; results are then empty
    pub error: Option<String>,
    /// Canonical query string for sharing this search
    pub query: String,
}

/// Run one search seeded from the query string
///
/// GET /api/search?q=..&location=..&category=..
async fn search_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Json<SearchResponse> {
    let seed = SearchState::from_query_string(query.as_deref().unwrap_or_default());
    let mut controller =
        SearchController::with_state(seed, state.geocoder.clone(), state.directory.clone());
    controller.search().await;

    let params = controller.last_params().cloned().unwrap_or_default();
    let resolved = controller.resolved().cloned();
    let search = controller.into_state();

    Json(SearchResponse {
        params,
        resolved,
        query: search.to_query_string(),
        total: search.total,
        error: search.error,
        results: search.results,
    })
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    #[serde(default)]
    pub q: String,
}

/// Geocode response; `result` is null when nothing matched
#[derive(Debug, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub query: String,
    pub result: Option<GeoLocation>,
}

/// Geocode a place name through the shared cache
///
/// GET /api/geocode?q=Boston
async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query must not be empty", "EMPTY_QUERY"));
    }

    let result = state.geocoder.geocode(&query).await;
    Ok(Json(GeocodeResponse { query, result }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// List categories from the directory
///
/// GET /api/categories
async fn categories_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state.directory.categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// Approximate position of this machine
///
/// GET /api/location
async fn location_handler(State(state): State<Arc<AppState>>) -> Json<LocationOutcome> {
    Json(state.locator.locate().await)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: Vec<ViewInfo>,
    pub default: String,
}

/// List result views
///
/// GET /api/views
async fn views_handler(State(state): State<Arc<AppState>>) -> Json<ViewsResponse> {
    Json(ViewsResponse {
        views: available_views(),
        default: state.config.defaults.view.clone(),
    })
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub api_url: String,
    pub geocode_cache_entries: usize,
    pub uptime_secs: u64,
}

/// Server status
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    info!("status requested");
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_url: state.directory.base_url().to_string(),
        geocode_cache_entries: state.geocoder.cache().len(),
        uptime_secs: state.uptime_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_state(server: &MockServer) -> Arc<AppState> {
        let mut config = Config::default();
        config.api.url = server.uri();
        config.geocode.url = server.uri();
        config.location.url = format!("{}/json/", server.uri());
        Arc::new(AppState::new(config).unwrap())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        state: Arc<AppState>,
        uri: &str,
    ) -> (StatusCode, T) {
        let response = create_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let server = MockServer::start().await;
        let (status, body): (_, StatusResponse) =
            get_json(create_test_state(&server), "/api/status").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.running);
        assert_eq!(body.api_url, server.uri());
        assert_eq!(body.geocode_cache_entries, 0);
    }

    #[tokio::test]
    async fn test_views_endpoint() {
        let server = MockServer::start().await;
        let (_, body): (_, ViewsResponse) =
            get_json(create_test_state(&server), "/api/views").await;

        assert_eq!(body.views.len(), 4);
        assert_eq!(body.default, "list");
    }

    #[tokio::test]
    async fn test_search_geocodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Boston"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"lat": "42.3601", "lon": "-71.0589"}])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/public/businesses"))
            .and(query_param("location", "Boston"))
            .and(query_param("radius_km", "50.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 1, "name": "Harbor Deli", "latitude": 42.36, "longitude": -71.05}],
                "total": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body): (_, SearchResponse) =
            get_json(create_test_state(&server), "/api/search?q=Boston&open_now=true").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.params.search, None);
        assert_eq!(body.params.is_open, Some(true));
        assert_eq!(body.params.latitude, Some(42.3601));
        assert_eq!(body.results[0].name, "Harbor Deli");
        assert_eq!(body.total, 1);
        assert!(body.error.is_none());
        assert_eq!(body.query, "q=Boston&open_now=true");
    }

    #[tokio::test]
    async fn test_search_failure_reports_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/businesses"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, body): (_, SearchResponse) =
            get_json(create_test_state(&server), "/api/search?sort_by=rating").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.results.is_empty());
        assert!(body.error.unwrap().contains("500"));
        assert_eq!(body.params.sort_by.map(|s| s.to_string()), Some("rating".to_string()));
    }

    #[tokio::test]
    async fn test_geocode_requires_query() {
        let server = MockServer::start().await;
        let (status, body): (_, ApiError) =
            get_json(create_test_state(&server), "/api/geocode?q=%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "EMPTY_QUERY");
    }

    #[tokio::test]
    async fn test_geocode_cached_across_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"lat": "40.71", "lon": "-74.0", "display_name": "New York"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let state = create_test_state(&server);
        let (_, first): (_, GeocodeResponse) =
            get_json(state.clone(), "/api/geocode?q=New%20York").await;
        let (_, second): (_, GeocodeResponse) =
            get_json(state.clone(), "/api/geocode?q=new%20york%20").await;

        assert_eq!(first.result, second.result);
        assert_eq!(state.geocoder.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_categories_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/categories"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (status, body): (_, ApiError) =
            get_json(create_test_state(&server), "/api/categories").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "DIRECTORY_ERROR");
    }

    #[tokio::test]
    async fn test_location_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"latitude": 51.5, "longitude": -0.12})),
            )
            .mount(&server)
            .await;

        let (_, body): (_, LocationOutcome) =
            get_json(create_test_state(&server), "/api/location").await;

        assert_eq!(body.error, None);
        assert_eq!(body.coords.unwrap().latitude, 51.5);
    }
}
