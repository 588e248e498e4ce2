//! Static file serving for the single-page UI (app/assets).

use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;
use serde_json::json;

#[derive(Embed)]
#[folder = "assets/"]
struct UiAssets;

/// Serve the UI for bare `/` requests.
pub async fn index() -> Response {
    serve_embedded("index.html")
}

/// Unmatched routes: API paths get a JSON 404, everything else the embedded UI.
pub async fn fallback(uri: Uri) -> Response {
    let request_path = uri.path();
    if is_api_path(request_path) {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "Not Found",
                "path": request_path,
            })),
        )
            .into_response();
    }

    serve_embedded(request_path.trim_start_matches('/'))
}

fn is_api_path(path: &str) -> bool {
    const API_PREFIXES: [&str; 2] = ["/api", "/status"];

    API_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

fn serve_embedded(path: &str) -> Response {
    let (path, asset) = match UiAssets::get(path) {
        Some(asset) => (path, Some(asset)),
        None => ("index.html", UiAssets::get("index.html")),
    };

    match asset {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::{fallback, index, is_api_path};
    use axum::body::to_bytes;
    use axum::http::{StatusCode, Uri, header};

    #[test]
    fn should_detect_api_paths_by_root_segment() {
        for path in ["/api", "/api/qr/nope", "/status", "/status/x"] {
            assert!(is_api_path(path), "{path} should be an API path");
        }
        for path in ["/", "/apiary", "/index.html", "/statuses"] {
            assert!(!is_api_path(path), "{path} should not be an API path");
        }
    }

    #[tokio::test]
    async fn index_serves_html() {
        let response = index().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/api/qr/preview"));
        assert!(html.contains("/api/qr/download"));
    }

    #[tokio::test]
    async fn unknown_page_falls_back_to_index() {
        let response = fallback(Uri::from_static("/some/page")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html"
        );
    }

    #[tokio::test]
    async fn fallback_returns_json_404_for_api() {
        let response = fallback(Uri::from_static("/api/nonexistent")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/api/nonexistent");
    }
}
