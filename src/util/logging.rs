//! Structured logging setup for patchsmith
//!
//! Logs go to stderr through the `tracing` ecosystem. Stdout stays free for
//! the download report, builder output and the run summary.
//!
//! The level comes from, in order: `--log-level`, `-v` / `-q`, then
//! `PATCHSMITH_LOG_LEVEL`. `PATCHSMITH_LOG_JSON=true` switches to JSON lines
//! for CI logs. `RUST_LOG` still adds per-module directives.

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    /// One JSON object per line, with file and line metadata
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Resolves the level from command-line flags, falling back to the
    /// environment when neither an explicit level nor `-v`/`-q` is given
    pub fn from_flags(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let env_level = env::var("PATCHSMITH_LOG_LEVEL").ok();
        let json = env::var("PATCHSMITH_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level: resolve_level(log_level, verbose, quiet, env_level.as_deref()),
            format: if json { LogFormat::Json } else { LogFormat::Pretty },
        }
    }
}

fn resolve_level(
    explicit: Option<&str>,
    verbose: bool,
    quiet: bool,
    env_level: Option<&str>,
) -> Level {
    match (explicit, verbose, quiet) {
        (Some(level), _, _) => parse_level(level),
        (None, true, _) => Level::DEBUG,
        (None, false, true) => Level::ERROR,
        (None, false, false) => env_level.map(parse_level).unwrap_or(Level::INFO),
    }
}

/// Parses a log level from a string
///
/// Case-insensitive; anything unrecognized falls back to `Level::INFO`.
///
/// ```
/// use patchsmith::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn filter_for(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("patchsmith={}", level).parse().unwrap());

    if env::var("RUST_LOG").is_ok() {
        return filter;
    }
    // HTTP stack internals are noisy at debug level.
    ["h2=warn", "hyper=warn", "reqwest=warn"]
        .into_iter()
        .fold(filter, |filter, directive| {
            filter.add_directive(directive.parse().unwrap())
        })
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter_for(config.level));
        let layer = fmt::layer().with_writer(std::io::stderr);

        match config.format {
            LogFormat::Pretty => registry.with(layer.with_target(false)).init(),
            LogFormat::Json => registry
                .with(
                    layer
                        .json()
                        .with_file(true)
                        .with_line_number(true)
                        .with_thread_names(true),
                )
                .init(),
        }
    });
}
