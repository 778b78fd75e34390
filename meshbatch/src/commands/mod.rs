mod all;
mod find_nodes;

pub use all::handle_all;
pub use find_nodes::handle_find_nodes;

use meshbatch_core::settings::EnvSource;
use meshbatch_core::{EnvFile, Settings};
use std::path::Path;
use tracing::debug;

/// Resolve settings once: CLI overrides, then environment, then env file
fn load_settings(
    env: &impl EnvSource,
    env_file: &Path,
    remote_nodes: Option<String>,
    program: Option<String>,
) -> Settings {
    let file = EnvFile::load(env_file);
    debug!(
        "Loaded {count} value(s) from {path}",
        count = file.len(),
        path = env_file.display()
    );
    Settings::resolve(env, &file).with_overrides(remote_nodes, program)
}
