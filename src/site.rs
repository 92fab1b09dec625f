//! Landing page
//!
//! - GET / — `index.html` from the public directory with the globe token
//!   substituted; a placeholder page when the file is missing.

use axum::{extract::State, response::Html, routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;

/// Marker in `index.html` replaced by the globe display token
pub const TOKEN_PLACEHOLDER: &str = "YOUR_CESIUM_TOKEN_HERE";

const FALLBACK_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Ares Travel</title></head>
<body>
    <h1>🚀 Ares Travel</h1>
    <p>Sistema in costruzione...</p>
</body>
</html>
"#;

/// Shared state for the landing page
#[derive(Clone)]
pub struct SiteState {
    pub public_dir: Arc<PathBuf>,
    /// Globe token; empty leaves the placeholder untouched
    pub token: Arc<String>,
}

/// Create the site router
pub fn site_router(state: SiteState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

/// GET /
async fn index(State(state): State<SiteState>) -> Html<String> {
    let path = state.public_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(render_index(html, &state.token)),
        Err(e) => {
            tracing::debug!(path = %path.display(), "Serving placeholder page: {}", e);
            Html(FALLBACK_PAGE.to_string())
        }
    }
}

fn render_index(html: String, token: &str) -> String {
    if token.is_empty() {
        html
    } else {
        html.replace(TOKEN_PLACEHOLDER, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn fetch(state: SiteState) -> String {
        let response = site_router(state)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_render_index() {
        let html = format!("<script>token='{}'</script>", TOKEN_PLACEHOLDER);
        assert_eq!(render_index(html.clone(), ""), html);
        assert_eq!(render_index(html, "abc"), "<script>token='abc'</script>");
    }

    #[tokio::test]
    async fn test_index_injects_token() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<html>YOUR_CESIUM_TOKEN_HERE</html>",
        )
        .unwrap();

        let body = fetch(SiteState {
            public_dir: Arc::new(dir.path().to_path_buf()),
            token: Arc::new("tok-123".to_string()),
        })
        .await;
        assert_eq!(body, "<html>tok-123</html>");
    }

    #[tokio::test]
    async fn test_missing_index_serves_placeholder() {
        let dir = TempDir::new().unwrap();
        let body = fetch(SiteState {
            public_dir: Arc::new(dir.path().join("nope")),
            token: Arc::new(String::new()),
        })
        .await;
        assert!(body.contains("Sistema in costruzione"));
    }
}
