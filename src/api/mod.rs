//! ClipShelf HTTP API
//!
//! HTTP layer for ClipShelf, built with Axum.
//!
//! # Endpoints
//!
//! ## Entries
//! - `GET /api/v1/rooms/:room/entries` - Latest entry and history
//! - `POST /api/v1/rooms/:room/entries` - Submit text
//! - `DELETE /api/v1/rooms/:room/entries` - Clear all entries
//!
//! ## Rooms
//! - `POST /api/v1/rooms` - Generate a new room
//!
//! ## Files
//! - `GET /api/v1/files` - List shared files
//! - `POST /api/v1/files` - Upload files (multipart)
//! - `DELETE /api/v1/files` - Delete every file
//! - `GET /api/v1/files/:name` - Download a file
//! - `DELETE /api/v1/files/:name` - Delete a file
//!
//! ## Pages
//! - `GET /`, `GET /r/:room` - HTML page, plus form actions under `/r/:room/`
//! - `GET /new-room` - Redirect to a fresh room
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws` - Change notifications
//!
//! # Example
//!
//! ```rust,ignore
//! use clipshelf::api::{serve, AppState};
//! use clipshelf::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let state = AppState::open(&config.storage, config.api.clone(), config.page.clone()).await?;
//!     serve(state, &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Entry routes
        .route(
            "/rooms/:room/entries",
            get(routes::entries::get_entries)
                .post(routes::entries::submit_entry)
                .delete(routes::entries::clear_entries),
        )
        // Room routes
        .route("/rooms", post(routes::rooms::create_room))
        // File routes
        .route(
            "/files",
            get(routes::files::list_files)
                .post(routes::files::upload_files)
                .delete(routes::files::delete_all_files),
        )
        .route(
            "/files/:name",
            get(routes::files::download_file).delete(routes::files::delete_file),
        )
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let page_routes = Router::new()
        .route("/", get(routes::page::default_page))
        .route("/new-room", get(routes::page::new_room))
        .route("/r/:room", get(routes::page::room_page))
        .route("/r/:room/submit", post(routes::page::submit_form))
        .route("/r/:room/clear", post(routes::page::clear_form))
        .route("/r/:room/files", post(routes::page::upload_form))
        .route(
            "/r/:room/files/:name/delete",
            post(routes::page::delete_file_form),
        )
        .route("/r/:room/clear-files", post(routes::page::delete_all_form));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config);

    let shared_state = Arc::new(state);

    Router::new()
        .merge(page_routes)
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(body_limit)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured, otherwise the listed origins
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Start the HTTP server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("ClipShelf listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("ClipShelf shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PageConfig, StorageConfig};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "clipshelf-test-boundary";

    async fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = StorageConfig {
            data_dir: dir.path().to_string_lossy().to_string(),
            shelf_dir: None,
        };
        let state = AppState::open(&storage, ApiConfig::default(), PageConfig::default())
            .await
            .unwrap();

        (build_router(state), dir)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn submit_json(room: &str, text: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/rooms/{}/entries", room))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "text": text }).to_string()))
            .unwrap()
    }

    fn upload(uri: &str, name: &str, contents: &str) -> Request<Body> {
        upload_many(uri, &[(name, contents)])
    }

    fn upload_many(uri: &str, files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, contents) in files {
            body.push_str(&format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{contents}\r\n",
                b = BOUNDARY,
                name = name,
                contents = contents,
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _dir) = create_test_app().await;

        assert_eq!(send(&app, get("/health/live")).await.status(), StatusCode::OK);
        assert_eq!(send(&app, get("/health/ready")).await.status(), StatusCode::OK);

        let response = send(&app, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let health = body_json(response).await;
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["shelf"], "ok");
    }

    #[tokio::test]
    async fn test_empty_room() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, get("/api/v1/rooms/default/entries")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let view = body_json(response).await;
        assert_eq!(view["count"], 0);
        assert!(view["latest"].is_null());
        assert_eq!(view["history"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_submit_and_view() {
        let (app, dir) = create_test_app().await;

        let response = send(&app, submit_json("default", "hello")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");

        send(&app, submit_json("default", "world")).await;

        let view = body_json(send(&app, get("/api/v1/rooms/default/entries")).await).await;
        assert_eq!(view["count"], 2);
        assert_eq!(view["latest"]["text"], "world");
        assert_eq!(view["history"][0]["text"], "hello");

        assert!(dir.path().join("clipboard_entries.json").exists());
    }

    #[tokio::test]
    async fn test_blank_submit_is_ignored() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, submit_json("default", "   ")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["entries"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_submit_invalid_json() {
        let (app, _dir) = create_test_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/rooms/default/entries")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();

        assert_eq!(send(&app, request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_room() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, get("/api/v1/rooms/nope/entries")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_ROOM");
    }

    #[tokio::test]
    async fn test_clear_entries() {
        let (app, _dir) = create_test_app().await;
        send(&app, submit_json("default", "x")).await;

        let response = send(&app, delete("/api/v1/rooms/default/entries")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let view = body_json(send(&app, get("/api/v1/rooms/default/entries")).await).await;
        assert_eq!(view["count"], 0);
    }

    #[tokio::test]
    async fn test_new_room_is_isolated() {
        let (app, dir) = create_test_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/rooms")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        let room = body["room"].as_str().unwrap().to_string();
        assert_eq!(room.len(), 8);
        assert_eq!(body["page"], format!("/r/{}", room));

        send(&app, submit_json(&room, "private")).await;

        let view = body_json(send(&app, get("/api/v1/rooms/default/entries")).await).await;
        assert_eq!(view["count"], 0);
        let uri = format!("/api/v1/rooms/{}/entries", room);
        let view = body_json(send(&app, get(&uri)).await).await;
        assert_eq!(view["latest"]["text"], "private");

        assert!(dir.path().join(format!("entries_{}.json", room)).exists());
    }

    #[tokio::test]
    async fn test_upload_list_download() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, upload("/api/v1/files", "a.txt", "original")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["stored"], serde_json::json!(["a.txt"]));

        let listing = body_json(send(&app, get("/api/v1/files")).await).await;
        assert_eq!(listing["files"][0]["name"], "a.txt");
        assert_eq!(listing["files"][0]["size"], 8);

        let response = send(&app, get("/api/v1/files/a.txt")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename*=UTF-8''a.txt"
        );
        assert_eq!(body_text(response).await, "original");
    }

    #[tokio::test]
    async fn test_same_name_upload_is_skipped() {
        let (app, _dir) = create_test_app().await;

        send(&app, upload("/api/v1/files", "a.txt", "original")).await;
        let response = send(&app, upload("/api/v1/files", "a.txt", "different")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["skipped"], serde_json::json!(["a.txt"]));

        let response = send(&app, get("/api/v1/files/a.txt")).await;
        assert_eq!(body_text(response).await, "original");
    }

    #[tokio::test]
    async fn test_rejected_batch_writes_nothing() {
        let (app, _dir) = create_test_app().await;

        let request = upload_many("/api/v1/files", &[("a.txt", "1"), (".bad", "2")]);
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_FILE_NAME");

        let listing = body_json(send(&app, get("/api/v1/files")).await).await;
        assert_eq!(listing["files"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_multi_file_upload() {
        let (app, _dir) = create_test_app().await;
        send(&app, upload("/api/v1/files", "a.txt", "old")).await;

        let request = upload_many("/api/v1/files", &[("a.txt", "new"), ("b.txt", "2")]);
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["stored"], serde_json::json!(["b.txt"]));
        assert_eq!(body["skipped"], serde_json::json!(["a.txt"]));
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, get("/api/v1/files/missing.txt")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_files() {
        let (app, _dir) = create_test_app().await;
        send(&app, upload("/api/v1/files", "a.txt", "1")).await;
        send(&app, upload("/api/v1/files", "b.txt", "2")).await;

        let response = send(&app, delete("/api/v1/files/a.txt")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, delete("/api/v1/files/a.txt")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, delete("/api/v1/files")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let listing = body_json(send(&app, get("/api/v1/files")).await).await;
        assert_eq!(listing["files"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_page_renders() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Clipboard is empty"));

        let response = send(&app, get("/r/bad")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_form_submit_redirects_to_page() {
        let (app, _dir) = create_test_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/r/default/submit")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("text=hello+%3Cworld%3E"))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let html = body_text(send(&app, get("/")).await).await;
        assert!(html.contains("hello &lt;world&gt;"));
    }

    #[tokio::test]
    async fn test_form_file_actions() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, upload("/r/ab12cd34/files", "a b.txt", "x")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/r/ab12cd34");

        let html = body_text(send(&app, get("/r/ab12cd34")).await).await;
        assert!(html.contains("a b.txt"));

        let request = Request::builder()
            .method("POST")
            .uri("/r/ab12cd34/files/a%20b.txt/delete")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&app, request).await.status(), StatusCode::SEE_OTHER);

        let listing = body_json(send(&app, get("/api/v1/files")).await).await;
        assert_eq!(listing["files"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_new_room_redirect() {
        let (app, _dir) = create_test_app().await;

        let response = send(&app, get("/new-room")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/r/"));
        assert_eq!(location.len(), "/r/".len() + 8);
    }
}
