//! Diagnostics for the `devkit` binary.
//!
//! Everything goes to stderr so task output on stdout stays clean.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Log level for a `-v` count: warn, info, then debug.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbosity` when set.
pub fn init(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive(level_for(verbosity).into()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .try_init()
}
