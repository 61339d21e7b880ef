//! Tracing subscriber setup for the CLI
//!
//! Log output goes to stderr so the final answer on stdout stays clean.
//! `RUST_LOG` takes precedence over the level chosen here.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Parse a level name, case-insensitively; unknown names yield `None`
pub fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Build the filter: `RUST_LOG` if set, else `turnloop=<level>` with noisy
/// HTTP crates held at warn
pub fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,turnloop={},hyper=warn,reqwest=warn",
            level.to_string().to_lowercase()
        ))
    })
}

/// Install the global subscriber; later calls are ignored
pub fn init_logging(level: Level) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(build_filter(level))
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init();
    });
}
