//! Create a staff superuser account in the configured database.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use ortho_config::OrthoConfig;
use recipe_backend::domain::ports::UserAccounts;
use recipe_backend::domain::{IdentityService, Password};
use recipe_backend::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};
use recipe_backend::outbound::security::Argon2PasswordHasher;
use recipe_backend::settings::ServerSettings;
use tokio::runtime::Builder;

/// `create-superuser` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-superuser",
    about = "Create an active staff superuser that can sign in to the API",
    version
)]
struct CliArgs {
    /// Login email of the new account.
    #[arg(long, value_name = "email")]
    email: String,
    /// Plaintext password; at least five characters.
    #[arg(long, value_name = "password")]
    password: String,
    /// Database connection URL. Falls back to `RECIPE_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let password = Password::new(&args.password)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

    let database_url = resolve_database_url(args.database_url)?;
    run_pending_migrations(&database_url)
        .await
        .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let accounts = IdentityService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselAuthTokenRepository::new(pool)),
        Arc::new(Argon2PasswordHasher::default()),
    );
    let user = accounts
        .create_superuser(&args.email, password)
        .await
        .map_err(|error| io::Error::other(format!("create superuser: {error}")))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "id={}", user.id())?;
    writeln!(stdout, "email={}", user.email())
}

fn resolve_database_url(cli_value: Option<String>) -> io::Result<String> {
    if let Some(url) = cli_value.filter(|url| !url.trim().is_empty()) {
        return Ok(url);
    }
    let settings = ServerSettings::load_from_iter([OsString::from("create-superuser")])
        .map_err(io::Error::other)?;
    settings.database_url().map(str::to_owned).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "a database URL is required: pass --database-url or set RECIPE_DATABASE_URL",
        )
    })
}
