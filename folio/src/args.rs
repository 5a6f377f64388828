use clap::{arg, command, Parser, Subcommand};

pub fn parse_args() -> Args {
    Args::parse()
}

#[derive(Debug, Parser)]
#[command(version, about = "Administration tasks for a folio site", long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        env = "DATABASE_URL",
        global = true,
        help = "Database connection string. If not specified, the same default database as \
        the web server is used."
    )]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database, apply migrations and make sure the first admin
    /// account exists.
    InitDb {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long, default_value = "admin@example.com")]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", default_value = "admin123", hide_env_values = true)]
        password: String,
    },

    /// Add another account that can log in to the admin API.
    CreateUser {
        username: String,
        email: String,
        #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Replace the password of an existing account.
    SetPassword {
        username: String,
        #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
}
