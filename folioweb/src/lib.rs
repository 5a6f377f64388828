use std::{path::PathBuf, sync::Arc};

use axum::{extract::DefaultBodyLimit, Router};
use folio_core::media::MediaStore;
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha512};
use time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::{
    cookie::{Key, SameSite},
    service::SignedCookie,
    Expiry, SessionManagerLayer,
};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::warn;

pub mod api;
pub mod args;
pub mod asset;
pub mod auth;
pub mod error;
pub mod extract;
mod index;

pub use args::DEFAULT_MAX_UPLOAD_BYTES;

/// How long a session survives without requests.
pub const SESSION_IDLE_DAYS: i64 = 7;

pub type Sessions = SessionManagerLayer<SqliteStore, SignedCookie>;

/// Everything a handler needs, passed explicitly as axum state.
#[derive(Clone)]
pub struct AppContext {
    pub db: DatabaseConnection,
    pub media: MediaStore,
    pub frontend_dir: Arc<PathBuf>,
}

impl AppContext {
    pub fn new<P: Into<PathBuf>>(db: DatabaseConnection, media: MediaStore, frontend_dir: P) -> Self {
        Self {
            db,
            media,
            frontend_dir: Arc::new(frontend_dir.into()),
        }
    }
}

/// Creates the session store in the application's own SQLite database and
/// the layer that signs session cookies. The signing key is derived from
/// `secret`; without one a random key is used and sessions end on restart.
pub async fn session_layer(db: &DatabaseConnection, secret: Option<&str>) -> anyhow::Result<(Sessions, SqliteStore)> {
    let store = SqliteStore::new(db.get_sqlite_connection_pool().clone());
    store.migrate().await?;

    let key = match secret.filter(|s| !s.is_empty()) {
        Some(secret) => Key::from(&Sha512::digest(secret.as_bytes())),
        None => {
            warn!("SECRET_KEY is not set; using a random session key");
            Key::generate()
        }
    };

    let layer = SessionManagerLayer::new(store.clone())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_IDLE_DAYS)))
        .with_signed(key);

    Ok((layer, store))
}

/// Assembles the whole application.
pub fn build_router(ctx: AppContext, sessions: Sessions, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::public::router().layer(cors))
        .nest("/admin", api::admin::router())
        .fallback(asset::frontend_handler)
        .layer(sessions)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
