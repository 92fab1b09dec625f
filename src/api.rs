//! Unified API router for Ares Travel
//!
//! Merges all module routers into a single axum `Router` with CORS,
//! request tracing and a shared application state.
//!
//! ## Endpoint Map
//!
//! | Path                | Module    | Description                        |
//! |---------------------|-----------|------------------------------------|
//! | `/`                 | site      | Landing page                       |
//! | `/health`           | api       | Connections, globe, provider probe |
//! | `/destinations`     | api       | Destination catalog                |
//! | `/config`           | api       | Client configuration               |
//! | `/bookings[/:id]`   | bookings  | Create, list, fetch bookings       |
//! | `/api/chat`         | assistant | Chat over HTTP                     |
//! | `/api/test-openai`  | assistant | Provider latency diagnostic        |
//! | `/ws`               | realtime  | Chat WebSocket                     |

use crate::assistant::{assistant_router, Assistant, AssistantState, ProbeStatus, ProviderMode};
use crate::bookings::{bookings_router, BookingStore, BookingsState};
use crate::catalog::Catalog;
use crate::config::AresConfig;
use crate::realtime::{realtime_router, ConnectionRegistry, RealtimeState};
use crate::site::{site_router, SiteState};
use axum::{
    extract::State,
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Combined application state holding references to all subsystems
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AresConfig>,
    pub catalog: Arc<Catalog>,
    pub registry: Arc<ConnectionRegistry>,
    pub assistant: Arc<Assistant>,
    pub bookings: Arc<BookingStore>,
}

/// Build the complete Ares Travel HTTP application
///
/// Merges all module routers, adds CORS and tracing middleware, and returns
/// a single `Router` ready to be served by `axum::serve`.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors(&state.config.server.cors_origins);

    let site_state = SiteState {
        public_dir: Arc::new(state.config.server.public_dir.clone()),
        token: Arc::new(state.config.globe.token()),
    };
    let realtime_state = RealtimeState {
        registry: state.registry.clone(),
        assistant: state.assistant.clone(),
        keepalive: state.config.session.keepalive(),
    };
    let assistant_state = AssistantState {
        assistant: state.assistant.clone(),
    };
    let bookings_state = BookingsState {
        store: state.bookings.clone(),
        catalog: state.catalog.clone(),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/destinations", get(list_destinations))
        .route("/config", get(client_config))
        .with_state(state)
        .merge(site_router(site_state))
        .merge(bookings_router(bookings_state))
        .merge(assistant_router(assistant_state))
        .merge(realtime_router(realtime_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// =============================================================================
// Root handlers
// =============================================================================

/// GET /health
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let connections = state.registry.len().await;
    let token_set = !state.config.globe.token().is_empty();
    let globe = if token_set { "cesium" } else { "fallback" };

    let probe = state.assistant.probe().await;
    let mut openai_details = json!({
        "mode": "mock",
        "enabled": state.assistant.live_selected(),
    });
    match &probe {
        ProbeStatus::NoKey => openai_details["error"] = json!("API key mancante"),
        ProbeStatus::Quota => openai_details["error"] = json!("Quota esaurita"),
        ProbeStatus::Live => openai_details["last_test"] = json!("ok"),
        ProbeStatus::Error(msg) => openai_details["error"] = json!(msg),
        ProbeStatus::Mock => {}
    }

    tracing::debug!(
        connections,
        globe,
        openai = probe.as_str(),
        "Health check"
    );

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        "destinations": state.catalog.len(),
        "connections": connections,
        "ws": connections > 0,
        "globe": globe,
        "globe_details": {
            "cesium_token": token_set,
            "destinations_loaded": state.catalog.len(),
        },
        "openai": probe.as_str(),
        "openai_details": openai_details,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /destinations
async fn list_destinations(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "destinations": state.catalog.all(),
        "count": state.catalog.len(),
        "server_time": chrono::Local::now().format("%H:%M:%S").to_string(),
    }))
}

/// GET /config
async fn client_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "cesiumToken": state.config.globe.token(),
        "openaiEnabled": state.assistant.mode() == ProviderMode::Live,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DataDocument, DataFile};
    use axum::{body::Body, http::Request, http::StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn make_state(dir: &TempDir) -> AppState {
        make_state_with(dir, AresConfig::default())
    }

    fn make_state_with(dir: &TempDir, config: AresConfig) -> AppState {
        let data = DataFile::new(dir.path().join("scratch.json"), dir.path().join("seed.json"));
        AppState {
            assistant: Arc::new(Assistant::from_config(&config.assistant).unwrap()),
            config: Arc::new(config),
            catalog: Arc::new(Catalog::default()),
            registry: Arc::new(ConnectionRegistry::new()),
            bookings: Arc::new(BookingStore::new(data, DataDocument::default())),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_mock_mode() {
        let dir = TempDir::new().unwrap();
        let (status, json) = get_json(build_app(make_state(&dir)), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["destinations"], 5);
        assert_eq!(json["connections"], 0);
        assert_eq!(json["ws"], false);
        assert_eq!(json["openai"], "mock");
        assert_eq!(json["openai_details"]["mode"], "mock");
        assert_eq!(json["openai_details"]["enabled"], false);
        assert_eq!(json["globe_details"]["destinations_loaded"], 5);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_destinations() {
        let dir = TempDir::new().unwrap();
        let (status, json) = get_json(build_app(make_state(&dir)), "/destinations").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 5);
        assert_eq!(json["destinations"][0]["name"], "Tokyo, Giappone");
        assert_eq!(json["server_time"].as_str().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_client_config() {
        let dir = TempDir::new().unwrap();
        let (status, json) = get_json(build_app(make_state(&dir)), "/config").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["openaiEnabled"], false);
        assert!(json["cesiumToken"].is_string());
    }

    #[tokio::test]
    async fn test_module_routes_are_merged() {
        let dir = TempDir::new().unwrap();
        let state = make_state(&dir);

        let (status, json) = get_json(build_app(state.clone()), "/bookings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 0);

        let (_, json) = get_json(build_app(state), "/api/test-openai").await;
        assert_eq!(json["error"], "OpenAI disabilitato");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let dir = TempDir::new().unwrap();
        let response = build_app(make_state(&dir))
            .oneshot(
                Request::get("/destinations")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_restricted_to_configured_origins() {
        let dir = TempDir::new().unwrap();
        let mut config = AresConfig::default();
        config.server.cors_origins = vec![
            "http://localhost:5000".to_string(),
            "https://ares.example.com".to_string(),
        ];
        let app = build_app(make_state_with(&dir, config));

        let request = |origin: &str| {
            Request::get("/destinations")
                .header("origin", origin)
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app.clone().oneshot(request("http://localhost:5000")).await.unwrap();
        assert_eq!(
            allowed.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5000"
        );

        let denied = app.oneshot(request("http://evil.example")).await.unwrap();
        assert_eq!(denied.status(), StatusCode::OK);
        assert!(denied.headers().get("access-control-allow-origin").is_none());
    }
}
