use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

pub mod entity;
pub mod migration;
pub mod repo;

pub use repo::{RepoError, RepoResult, Visibility};

/// Name of the database file used when no URL is configured.
pub const DEFAULT_DATABASE_FILE: &str = "folio.db";

/// Connects to the database and applies any pending migrations. Call this
/// before doing any other database operations. For file-backed SQLite URLs
/// the parent directory is created first.
pub async fn initialise_database(url: &str) -> Result<DatabaseConnection> {
    if let Some(path) = sqlite_file_path(url) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                anyhow!("Could not create database parent directory {parent:?}; {err}")
            })?;
        }
    }

    info!("Connecting to {url}");
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.sqlx_logging(false);
    let db = Database::connect(opt).await?;
    db.ping().await?;

    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Builds a SQLite connection URL that creates the file if it is missing.
pub fn sqlite_url<P: AsRef<Path>>(db_path: P) -> String {
    // Non-UTF-8 paths are lossily converted; good enough for a data file.
    format!("sqlite:{}?mode=rwc", db_path.as_ref().to_string_lossy())
}

/// The database file in the per-user data directory, e.g.
/// `~/.local/share/folio/folio.db` on Linux.
pub fn default_database_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "folio")
        .map(|dirs| dirs.data_local_dir().join(DEFAULT_DATABASE_FILE))
}

/// Extracts the file path from a `sqlite:` URL. In-memory databases and
/// other backends give `None`.
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_paths() {
        assert_eq!(
            sqlite_file_path("sqlite:/tmp/x/folio.db?mode=rwc"),
            Some(PathBuf::from("/tmp/x/folio.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite://data/folio.db"),
            Some(PathBuf::from("data/folio.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/folio"), None);
    }

    #[test]
    fn url_requests_create() {
        assert_eq!(sqlite_url("/a/b.db"), "sqlite:/a/b.db?mode=rwc");
    }
}
