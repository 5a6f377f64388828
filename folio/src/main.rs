use anyhow::{Context, Result};
use args::{parse_args, Command};
use clap::builder::styling::AnsiColor;
use env_logger::{Builder, Env};
use folio_database::{default_database_path, initialise_database, repo::users, sqlite_url};
use log::{debug, info, logger, warn, Level};
use logging_timer::time;
use std::io::Write;

mod args;

pub const PROGRAM_NAME: &str = env!("CARGO_PKG_NAME");

#[time]
fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    configure_logging();
    main2()?;
    logger().flush();
    Ok(())
}

#[time]
fn main2() -> Result<()> {
    info!("Starting {PROGRAM_NAME}");

    let args = parse_args();
    debug!("{:?}", &args.command);

    let database_url = match args.database_url {
        Some(url) => url,
        None => sqlite_url(default_database_path().context("Cannot determine path to database")?),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(&database_url, args.command))
}

async fn run(database_url: &str, command: Command) -> Result<()> {
    let db = initialise_database(database_url).await?;
    info!("Database {database_url} is up to date");

    match command {
        Command::InitDb {
            username,
            email,
            password,
        } => {
            if users::ensure_user(&db, &username, &email, &password).await? {
                info!("Created user {username}");
                warn!("Change the password of {username} before exposing the site");
            } else {
                info!("User {username} already exists, leaving it alone");
            }
        }
        Command::CreateUser {
            username,
            email,
            password,
        } => {
            let user = users::create(&db, &username, &email, &password).await?;
            info!("Created user {} with id {}", user.username, user.id);
        }
        Command::SetPassword { username, password } => {
            users::set_password(&db, &username, &password).await?;
            info!("Password changed for {username}");
        }
    }

    Ok(())
}

/// Log lines are `[time LEVEL] message`. Records from other crates (the
/// database layers, mostly) also name their target so they can be told
/// apart from the tool's own output.
fn configure_logging() {
    // sqlx logs every statement at info.
    let mut builder = Builder::from_env(Env::default().default_filter_or("info,sqlx=warn,sea_orm_migration=warn"));

    builder.format(|buf, record| {
        let style = buf
            .default_level_style(record.level())
            .fg_color(Some(level_colour(record.level()).into()));
        let target = record.target();

        if is_own_target(target) {
            writeln!(buf, "[{} {style}{:5}{style:#}] {}", buf.timestamp_seconds(), record.level(), record.args())
        } else {
            writeln!(
                buf,
                "[{} {style}{:5}{style:#} {target}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        }
    });

    builder.init();
}

fn level_colour(level: Level) -> AnsiColor {
    match level {
        Level::Error => AnsiColor::Red,
        Level::Warn => AnsiColor::Yellow,
        Level::Info => AnsiColor::Green,
        Level::Debug | Level::Trace => AnsiColor::BrightBlack,
    }
}

fn is_own_target(target: &str) -> bool {
    target == PROGRAM_NAME || target.starts_with(&format!("{PROGRAM_NAME}::"))
}
