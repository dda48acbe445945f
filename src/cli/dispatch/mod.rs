//! Map parsed command-line arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_PORT, auth};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or out of range.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|v| !v.trim().is_empty())
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        token_leeway_seconds: auth_opts.token_leeway_seconds,
        argon2_memory_kib: auth_opts.argon2.memory_kib,
        argon2_iterations: auth_opts.argon2.iterations,
        argon2_parallelism: auth_opts.argon2.parallelism,
        request_timeout_seconds: auth_opts.request_timeout_seconds,
        db_max_connections: auth_opts.db_max_connections,
        init_schema: auth_opts.init_schema,
    }))
}
