use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_TOKEN_LEEWAY_SECONDS: &str = "token-leeway-seconds";
pub const ARG_ARGON2_MEMORY_KIB: &str = "argon2-memory-kib";
pub const ARG_ARGON2_ITERATIONS: &str = "argon2-iterations";
pub const ARG_ARGON2_PARALLELISM: &str = "argon2-parallelism";
pub const ARG_REQUEST_TIMEOUT_SECONDS: &str = "request-timeout-seconds";
pub const ARG_DB_MAX_CONNECTIONS: &str = "db-max-connections";
pub const ARG_INIT_SCHEMA: &str = "init-schema";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub token_ttl_seconds: u64,
    pub token_leeway_seconds: u64,
    pub argon2: Argon2Options,
    pub request_timeout_seconds: u64,
    pub db_max_connections: u32,
    pub init_schema: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Options {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Options {
    /// Parse authentication and server tuning arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a value is missing or out of range.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_u64 = |id: &str| -> anyhow::Result<u64> {
            matches
                .get_one::<u64>(id)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };
        let read_u32 = |id: &str| -> anyhow::Result<u32> {
            matches
                .get_one::<u32>(id)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        let token_ttl_seconds = read_u64(ARG_TOKEN_TTL_SECONDS)?;
        if token_ttl_seconds == 0 {
            anyhow::bail!("--{ARG_TOKEN_TTL_SECONDS} must be greater than zero");
        }

        let request_timeout_seconds = read_u64(ARG_REQUEST_TIMEOUT_SECONDS)?;
        if request_timeout_seconds == 0 {
            anyhow::bail!("--{ARG_REQUEST_TIMEOUT_SECONDS} must be greater than zero");
        }

        Ok(Self {
            token_ttl_seconds,
            token_leeway_seconds: read_u64(ARG_TOKEN_LEEWAY_SECONDS)?,
            argon2: Argon2Options {
                memory_kib: read_u32(ARG_ARGON2_MEMORY_KIB)?,
                iterations: read_u32(ARG_ARGON2_ITERATIONS)?,
                parallelism: read_u32(ARG_ARGON2_PARALLELISM)?,
            },
            request_timeout_seconds,
            db_max_connections: read_u32(ARG_DB_MAX_CONNECTIONS)?,
            init_schema: matches.get_flag(ARG_INIT_SCHEMA),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    let command = with_argon2_args(command);
    with_server_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Lifetime of issued tokens in seconds")
                .env("SSO_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_TOKEN_LEEWAY_SECONDS)
                .long(ARG_TOKEN_LEEWAY_SECONDS)
                .help("Clock skew tolerated when checking token expiry")
                .env("SSO_TOKEN_LEEWAY_SECONDS")
                .default_value("0")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn with_argon2_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ARGON2_MEMORY_KIB)
                .long(ARG_ARGON2_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("SSO_ARGON2_MEMORY_KIB")
                .default_value("19456")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_ARGON2_ITERATIONS)
                .long(ARG_ARGON2_ITERATIONS)
                .help("Argon2id iteration count")
                .env("SSO_ARGON2_ITERATIONS")
                .default_value("2")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_ARGON2_PARALLELISM)
                .long(ARG_ARGON2_PARALLELISM)
                .help("Argon2id lanes")
                .env("SSO_ARGON2_PARALLELISM")
                .default_value("1")
                .value_parser(clap::value_parser!(u32)),
        )
}

fn with_server_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT_SECONDS)
                .long(ARG_REQUEST_TIMEOUT_SECONDS)
                .help("Upper bound for handling a single request")
                .env("SSO_REQUEST_TIMEOUT_SECONDS")
                .default_value("30")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_DB_MAX_CONNECTIONS)
                .long(ARG_DB_MAX_CONNECTIONS)
                .help("Maximum database pool size")
                .env("SSO_DB_MAX_CONNECTIONS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_INIT_SCHEMA)
                .long(ARG_INIT_SCHEMA)
                .help("Create the users and apps tables if they do not exist")
                .env("SSO_INIT_SCHEMA")
                .action(ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV: [&str; 8] = [
        "SSO_TOKEN_TTL_SECONDS",
        "SSO_TOKEN_LEEWAY_SECONDS",
        "SSO_ARGON2_MEMORY_KIB",
        "SSO_ARGON2_ITERATIONS",
        "SSO_ARGON2_PARALLELISM",
        "SSO_REQUEST_TIMEOUT_SECONDS",
        "SSO_DB_MAX_CONNECTIONS",
        "SSO_INIT_SCHEMA",
    ];

    fn parse(args: &[&str]) -> anyhow::Result<Options> {
        let matches = with_args(Command::new("sso")).try_get_matches_from(args)?;
        Options::parse(&matches)
    }

    fn cleared<F: FnOnce()>(f: F) {
        temp_env::with_vars(ENV.map(|key| (key, None::<&str>)), f);
    }

    #[test]
    fn defaults() {
        cleared(|| {
            let options = parse(&["sso"]);
            assert!(options.is_ok());
            if let Ok(options) = options {
                assert_eq!(options.token_ttl_seconds, 3600);
                assert_eq!(options.token_leeway_seconds, 0);
                assert_eq!(
                    options.argon2,
                    Argon2Options {
                        memory_kib: 19_456,
                        iterations: 2,
                        parallelism: 1,
                    }
                );
                assert_eq!(options.request_timeout_seconds, 30);
                assert_eq!(options.db_max_connections, 5);
                assert!(!options.init_schema);
            }
        });
    }

    #[test]
    fn flags_override_defaults() {
        cleared(|| {
            let options = parse(&[
                "sso",
                "--token-ttl-seconds",
                "60",
                "--token-leeway-seconds",
                "5",
                "--argon2-memory-kib",
                "65536",
                "--init-schema",
            ]);
            assert!(options.is_ok());
            if let Ok(options) = options {
                assert_eq!(options.token_ttl_seconds, 60);
                assert_eq!(options.token_leeway_seconds, 5);
                assert_eq!(options.argon2.memory_kib, 65_536);
                assert!(options.init_schema);
            }
        });
    }

    #[test]
    fn env_overrides_defaults() {
        temp_env::with_vars(
            [
                ("SSO_TOKEN_TTL_SECONDS", Some("120")),
                ("SSO_ARGON2_ITERATIONS", Some("3")),
                ("SSO_DB_MAX_CONNECTIONS", Some("20")),
                ("SSO_INIT_SCHEMA", Some("true")),
            ],
            || {
                let options = parse(&["sso"]);
                assert!(options.is_ok());
                if let Ok(options) = options {
                    assert_eq!(options.token_ttl_seconds, 120);
                    assert_eq!(options.argon2.iterations, 3);
                    assert_eq!(options.db_max_connections, 20);
                    assert!(options.init_schema);
                }
            },
        );
    }

    #[test]
    fn zero_ttl_rejected() {
        cleared(|| {
            let err = parse(&["sso", "--token-ttl-seconds", "0"]).err();
            assert!(err.is_some_and(|e| e.to_string().contains("token-ttl-seconds")));
        });
    }

    #[test]
    fn zero_timeout_rejected() {
        cleared(|| {
            let err = parse(&["sso", "--request-timeout-seconds", "0"]).err();
            assert!(err.is_some_and(|e| e.to_string().contains("request-timeout-seconds")));
        });
    }

    #[test]
    fn zero_pool_size_rejected() {
        cleared(|| {
            assert!(parse(&["sso", "--db-max-connections", "0"]).is_err());
        });
    }
}
