use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::assets;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/scripts.js", get(client_script))
        .route("/api/images", get(list_images))
        .route("/images/{filename}", get(serve_image))
        .with_state(state)
}

pub async fn serve(config: Config) -> Result<()> {
    let addr = SocketAddr::new(
        config.bind_address.parse().context("invalid BIND_ADDRESS")?,
        config.port,
    );
    let router = router(AppState::new(config));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;
    info!(?addr, "slideshow server listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut term) = signal(SignalKind::terminate()) {
            term.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn index() -> Html<String> {
    let body = format!(
        "<!doctype html><html lang='en'><head><meta charset='utf-8'><meta name='viewport' content='width=device-width,initial-scale=1'>\
<title>Slideshow</title><style>{}</style></head><body><div id='imageContainer'></div><script src='/scripts.js'></script></body></html>",
        styles()
    );
    Html(body)
}

async fn client_script() -> Response {
    (
        [(header::CONTENT_TYPE, "text/javascript")],
        assets::SLIDESHOW_JS,
    )
        .into_response()
}

/// Current image listing, recomputed from the directory on every request so
/// the client sees sync results without a server restart.
async fn list_images(State(state): State<AppState>) -> Response {
    match inventory::scan_images(&state.config.image_dir, &state.config.allowed_extensions) {
        Ok(files) => Json(files).into_response(),
        Err(err) => {
            error!(error = ?err, "failed to scan image directory");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "image directory unavailable",
            )
                .into_response()
        }
    }
}

async fn serve_image(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    if !is_safe_filename(&filename) {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    match tokio::fs::read(state.config.image_dir.join(&filename)).await {
        Ok(bytes) => {
            let mut response = Response::new(bytes.into());
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static(content_type_for(&filename)),
            );
            response
        }
        Err(_) => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// Only bare filenames are served; anything that could climb out of the
/// image directory is treated as absent.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}

fn content_type_for(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn styles() -> &'static str {
    "body{margin:0;background:#000;overflow:hidden;font-family:system-ui,sans-serif;}\
#imageContainer{position:relative;width:100vw;height:100vh;}\
.image-layer{position:absolute;inset:0;width:100%;height:100%;object-fit:contain;opacity:0;transition:opacity 0.5s ease-in-out;}\
.image-layer.active{opacity:1;}\
.image-info{position:absolute;right:1rem;bottom:1rem;padding:0.25rem 0.75rem;border-radius:999px;background:rgba(0,0,0,0.55);color:#eee;font-size:0.9rem;z-index:2;}\
.server-offline-badge{position:absolute;left:1rem;top:1rem;padding:0.25rem 0.75rem;border-radius:6px;background:#b3261e;color:#fff;font-weight:600;z-index:2;}\
.loading{position:absolute;inset:0;display:flex;align-items:center;justify-content:center;color:#888;font-size:1.2rem;z-index:1;}"
}
