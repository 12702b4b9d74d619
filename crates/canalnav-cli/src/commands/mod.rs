//! Subcommand handlers.
//!
//! Each module handles one subcommand. `main.rs` parses arguments and
//! dispatches here.

pub mod build;
pub mod info;
pub mod locate;
pub mod route;

use std::path::Path;

use anyhow::{Context, Result};
use canalnav_lib::{load_network, resolve_data_dir, Network};
use tracing::debug;

/// Resolve the data directory and load the snapshot stored there.
pub fn load_snapshot(data_dir: Option<&Path>) -> Result<Network> {
    let dir = resolve_data_dir(data_dir).context("failed to resolve the dataset directory")?;
    debug!(dir = %dir.display(), "loading snapshot");
    load_network(&dir).with_context(|| format!("failed to load dataset from {}", dir.display()))
}

/// `Unknown location 'name'.` followed by suggestions when there are any.
pub(crate) fn format_unknown_location_message(name: &str, suggestions: &[String]) -> String {
    let mut message = format!("Unknown location '{}'.", name);
    let formatted = match suggestions {
        [] => return message,
        [only] => format!("Did you mean '{only}'?"),
        many => {
            let joined = many
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Did you mean one of: {}?", joined)
        }
    };
    message.push(' ');
    message.push_str(&formatted);
    message
}
