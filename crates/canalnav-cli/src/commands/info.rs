//! Info command handler: summarise the loaded snapshot.

use anyhow::Result;
use serde::Serialize;

use canalnav_lib::Network;

use crate::output::OutputFormat;

/// Counts describing a loaded snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub nodes: usize,
    pub links: usize,
    pub locators: usize,
    pub dangling_references: usize,
}

impl SnapshotInfo {
    pub fn from_network(network: &Network) -> Self {
        Self {
            nodes: network.node_count(),
            links: network.link_count(),
            locators: network.locator_count(),
            dangling_references: network.dangling_references().len(),
        }
    }

    fn render_text(&self) -> String {
        format!(
            "nodes: {}\nlinks: {}\nlocators: {}\ndangling references: {}\n",
            self.nodes, self.links, self.locators, self.dangling_references
        )
    }
}

/// Handle the info subcommand.
pub fn handle_info_command(network: &Network, format: OutputFormat) -> Result<()> {
    let info = SnapshotInfo::from_network(network);
    format.render_value(&info, || info.render_text())
}
