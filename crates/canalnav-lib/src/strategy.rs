//! Search strategies for routing over a [`Network`] snapshot.
//!
//! Nodes are borrowed junctions (`&Junction`), keyed by their name. Distances
//! come from [`crate::geodesic::Geodesic`].

use serde::Serialize;

use crate::error::{Error, Result};
use crate::network::{Junction, Network};
use crate::search::{CameFrom, KeyOf, NeighborsOf, Reconstruct};

/// Keys junctions by their name. Names are unique within a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameKey;

impl<'g> KeyOf<&'g Junction> for NameKey {
    type Key = String;

    fn key_of(&self, node: &&'g Junction) -> String {
        node.name.clone()
    }
}

/// Resolves each stored neighbor reference against the network.
///
/// A reference to a junction that is not in the snapshot is an error rather
/// than a silently skipped edge.
#[derive(Debug, Clone, Copy)]
pub struct GraphNeighbors<'g> {
    network: &'g Network,
}

impl<'g> GraphNeighbors<'g> {
    pub fn new(network: &'g Network) -> Self {
        Self { network }
    }
}

impl<'g> NeighborsOf<&'g Junction> for GraphNeighbors<'g> {
    fn neighbors_of(&self, node: &&'g Junction) -> Result<Vec<&'g Junction>> {
        let network = self.network;
        node.neighbors
            .iter()
            .map(|neighbor| {
                network
                    .node(neighbor.node())
                    .ok_or_else(|| Error::MissingNode {
                        from: node.name.clone(),
                        name: neighbor.node().to_string(),
                    })
            })
            .collect()
    }
}

/// One node of a reconstructed route and the link used to reach it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub node: Junction,
    /// `None` for the first step.
    pub link: Option<String>,
}

/// Rebuilds the route from start to goal, labelling every step with the link
/// taken from its predecessor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedReconstruct;

impl<'g> Reconstruct<String, &'g Junction> for LinkedReconstruct {
    type Path = Vec<RouteStep>;

    fn reconstruct(
        &self,
        came_from: &CameFrom<String, &'g Junction>,
        goal: &&'g Junction,
    ) -> Result<Vec<RouteStep>> {
        let chain = came_from.walk(&NameKey, goal);
        let mut steps = Vec::with_capacity(chain.len());
        let mut previous: Option<&Junction> = None;

        for &node in chain {
            let link = match previous {
                Some(from) => Some(link_between(from, node)?.to_string()),
                None => None,
            };
            steps.push(RouteStep {
                node: node.clone(),
                link,
            });
            previous = Some(node);
        }

        Ok(steps)
    }
}

/// First stored link on `from` whose neighbor is `to`.
pub fn link_between<'a>(from: &'a Junction, to: &Junction) -> Result<&'a str> {
    from.neighbors
        .iter()
        .find(|neighbor| neighbor.node() == to.name)
        .map(|neighbor| neighbor.link())
        .ok_or_else(|| Error::MissingLink {
            from: from.name.clone(),
            to: to.name.clone(),
        })
}
