//! Locate command handler: resolve a name the way `route` does.

use anyhow::Result;
use serde::Serialize;

use canalnav_lib::Network;

use super::format_unknown_location_message;
use crate::output::OutputFormat;

const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
struct Located<'a> {
    query: &'a str,
    id: &'a str,
    position: [f64; 2],
}

/// Print the junction `query` resolves to, or fail with suggestions.
pub fn handle_locate_command(network: &Network, query: &str, format: OutputFormat) -> Result<()> {
    let Some(junction) = network.locate(query) else {
        let suggestions = network.fuzzy_matches(query, SUGGESTION_LIMIT);
        anyhow::bail!(format_unknown_location_message(query, &suggestions));
    };

    let located = Located {
        query,
        id: &junction.name,
        position: junction.pos,
    };
    format.render_value(&located, || format!("{}\n", located.id))
}
