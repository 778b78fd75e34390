//! Command-line front end for meshbatch
//!
//! Shared pieces of the `meshtastic-find-nodes` and `meshtastic-all` binaries.

pub mod cli;
pub mod commands;
pub mod output;
pub mod utils;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the stderr log subscriber; `RUST_LOG` wins over the flags
pub fn setup_logging(verbose: bool, debug: bool) {
    let filter_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
