use std::path::PathBuf;

use clap::{arg, command, Parser};

/// 16 MiB, the largest request body accepted.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn parse_args() -> Args {
    Args::parse()
}

/// Server configuration. Every option can also be given in the environment
/// (or a `.env` file), which is how it is usually deployed.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, env = "PORT", default_value_t = 3000, help = "Port to serve the site on.")]
    pub port: u16,

    #[arg(
        short,
        long,
        env = "DATABASE_URL",
        help = "Database connection string, e.g. 'sqlite:folio.db?mode=rwc'. If not specified, \
        a SQLite database called 'folio.db' in your 'data_local_dir' (as specified by the \
        'directories' crate) is used."
    )]
    pub database_url: Option<String>,

    #[arg(
        short,
        long,
        env = "UPLOAD_FOLDER",
        default_value = "uploads",
        help = "Directory that uploaded images are stored in. Created if missing."
    )]
    pub upload_dir: PathBuf,

    #[arg(
        short,
        long,
        env = "FRONTEND_DIR",
        default_value = "out",
        help = "Directory holding the built single-page frontend."
    )]
    pub frontend_dir: PathBuf,

    #[arg(
        long,
        env = "SECRET_KEY",
        hide_env_values = true,
        help = "Secret used to sign session cookies. If not specified a random one is generated \
        and sessions do not survive a restart."
    )]
    pub secret_key: Option<String>,

    #[arg(
        long,
        env = "MAX_CONTENT_LENGTH",
        default_value_t = DEFAULT_MAX_UPLOAD_BYTES,
        help = "Largest request body accepted, in bytes."
    )]
    pub max_upload_bytes: usize,
}
