use std::time::Duration;

use anyhow::Context;
use folio_core::media::MediaStore;
use folio_database::{default_database_path, initialise_database, sqlite_url};
use folioweb::{args::parse_args, build_router, session_layer, AppContext};
use tokio::signal;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{info, warn};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    configure_tracing();

    let args = parse_args();

    let database_url = match args.database_url {
        Some(url) => url,
        None => sqlite_url(default_database_path().context("Cannot determine path to database")?),
    };
    let db = initialise_database(&database_url).await?;

    let (sessions, store) = session_layer(&db, args.secret_key.as_deref()).await?;
    let deletion_task = tokio::task::spawn(delete_expired_sessions(store));

    info!("Uploads are stored in {:?}", args.upload_dir);
    let media = MediaStore::new(&args.upload_dir);
    let ctx = AppContext::new(db, media, &args.frontend_dir);
    let app = build_router(ctx, sessions, args.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!("Listening on http://localhost:{}", listener.local_addr()?.port());

    // We block here until Ctrl-C or SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    deletion_task.abort();
    info!("Shut down");
    Ok(())
}

/// Purges expired sessions from the store once an hour.
async fn delete_expired_sessions(store: SqliteStore) {
    let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
    loop {
        interval.tick().await;
        if let Err(err) = store.delete_expired().await {
            warn!("Could not delete expired sessions: {err}");
        }
    }
}

fn configure_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
