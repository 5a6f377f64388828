use std::path::{Component, Path, PathBuf};

use axum::{
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{error::ApiError, extract::PathParam, index::placeholder_page, AppContext};

/// Serves a file from the upload directory. Only bare file names are
/// accepted, so nothing outside that directory can be reached.
pub async fn upload_handler(State(ctx): State<AppContext>, PathParam(filename): PathParam<String>) -> Response {
    match ctx.media.path_for_filename(&filename) {
        Some(path) => StaticFile::read(path).await.into_response(),
        None => ApiError::not_found().into_response(),
    }
}

/// Everything that is not API goes to the single-page frontend: an existing
/// file in the bundle is served as is, any other path gets the bundle's
/// `index.html` so that client-side routes work on reload. Without a bundle
/// a placeholder page is shown.
pub async fn frontend_handler(State(ctx): State<AppContext>, uri: Uri) -> Response {
    let root = ctx.frontend_dir.as_path();

    if let Some(path) = bundle_path(root, uri.path()) {
        if path.is_file() {
            return StaticFile::read(path).await.into_response();
        }
    }

    let index = root.join("index.html");
    if index.is_file() {
        return StaticFile::read(index).await.into_response();
    }

    placeholder_page().into_response()
}

/// Maps a request path to a path inside `root`. Paths with `..` or other
/// non-normal components are refused.
fn bundle_path(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let relative = Path::new(uri_path.trim_start_matches('/'));
    if relative.as_os_str().is_empty() {
        return None;
    }

    if relative.components().all(|c| matches!(c, Component::Normal(_))) {
        Some(root.join(relative))
    } else {
        None
    }
}

struct StaticFile {
    path: PathBuf,
    content: std::io::Result<Vec<u8>>,
}

impl StaticFile {
    async fn read(path: PathBuf) -> Self {
        let content = tokio::fs::read(&path).await;
        Self { path, content }
    }
}

impl IntoResponse for StaticFile {
    fn into_response(self) -> Response {
        match self.content {
            Ok(content) => {
                let mime = mime_guess::from_path(&self.path).first_or_octet_stream();
                ([(header::CONTENT_TYPE, mime.as_ref())], content).into_response()
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => ApiError::not_found().into_response(),
            Err(err) => {
                warn!("Could not read {:?}: {err}", self.path);
                ApiError::server_error(err).into_response()
            }
        }
    }
}
