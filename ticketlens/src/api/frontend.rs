use std::borrow::Cow;
use std::path::Path as FsPath;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

use super::AppState;

#[derive(RustEmbed)]
#[folder = "static"]
struct StaticAssets;

pub async fn serve_root(State(state): State<AppState>) -> Response {
    serve_asset_path(&state, "index.html").await
}

pub async fn serve_path(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_asset_path(&state, &path).await
}

async fn serve_asset_path(state: &AppState, path: &str) -> Response {
    let target = path.trim_start_matches('/');
    if target.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }

    if target.split(['/', '\\']).any(|segment| segment == "..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let bytes = match state.config.server.static_dir.as_deref() {
        Some(dir) => read_from_disk(dir, target).await,
        None => StaticAssets::get(target).map(|file| file.data),
    };

    match bytes.and_then(|data| response_for_bytes(target, data)) {
        Some(response) => response,
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn read_from_disk(dir: &str, target: &str) -> Option<Cow<'static, [u8]>> {
    let full = FsPath::new(dir).join(target);
    match tokio::fs::read(&full).await {
        Ok(data) => Some(Cow::Owned(data)),
        Err(e) => {
            tracing::debug!(path = %full.display(), error = %e, "Static file not served");
            None
        }
    }
}

fn response_for_bytes(path: &str, data: Cow<'static, [u8]>) -> Option<Response> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let mut response = Response::new(Body::from(data.into_owned()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref()).ok()?,
    );
    Some(response)
}
