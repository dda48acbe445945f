use crate::{
    api,
    auth::{Auth, AuthService, HashParams, PasswordHasher, TokenIssuer},
    cli::telemetry,
    storage::{PgStorage, PoolOptions},
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_ttl_seconds: u64,
    pub token_leeway_seconds: u64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub request_timeout_seconds: u64,
    pub db_max_connections: u32,
    pub init_schema: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the hash parameters are
/// rejected, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let hasher = PasswordHasher::new(HashParams {
        memory_kib: args.argon2_memory_kib,
        iterations: args.argon2_iterations,
        parallelism: args.argon2_parallelism,
    })
    .context("Invalid Argon2 configuration")?;

    let storage = PgStorage::connect(
        &args.dsn,
        PoolOptions {
            max_connections: args.db_max_connections,
            ..PoolOptions::default()
        },
    )
    .await?;
    storage.ping().await?;

    if args.init_schema {
        storage.apply_schema().await?;
        info!("Database schema applied");
    }

    let issuer = TokenIssuer::new().with_leeway(Duration::from_secs(args.token_leeway_seconds));

    let auth: Arc<dyn Auth> = Arc::new(AuthService::new(
        storage.clone(),
        storage.clone(),
        storage,
        hasher,
        issuer,
        Duration::from_secs(args.token_ttl_seconds),
    ));

    let result = api::new(
        args.port,
        auth,
        Duration::from_secs(args.request_timeout_seconds),
    )
    .await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("dsn", redact_dsn(&args.dsn)),
        ("token_ttl_seconds", args.token_ttl_seconds.to_string()),
        ("token_leeway_seconds", args.token_leeway_seconds.to_string()),
        (
            "argon2",
            format!(
                "m={},t={},p={}",
                args.argon2_memory_kib, args.argon2_iterations, args.argon2_parallelism
            ),
        ),
        (
            "request_timeout_seconds",
            args.request_timeout_seconds.to_string(),
        ),
        ("db_max_connections", args.db_max_connections.to_string()),
        ("init_schema", args.init_schema.to_string()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
