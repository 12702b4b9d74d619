//! In-memory waterway graph snapshot and name lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geodesic::Position;

/// Minimum normalised similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Reference from a junction to one of its neighbors: `[link_id, node_id]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeighborRef(pub String, pub String);

impl NeighborRef {
    pub fn new(link: impl Into<String>, node: impl Into<String>) -> Self {
        Self(link.into(), node.into())
    }

    /// Identifier of the link traversed by this hop.
    pub fn link(&self) -> &str {
        &self.0
    }

    /// Identifier of the neighboring junction.
    pub fn node(&self) -> &str {
        &self.1
    }
}

/// A point on the waterway network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub name: String,
    pub pos: Position,
    #[serde(default)]
    pub neighbors: Vec<NeighborRef>,
}

/// A named waterway that one or more hops travel along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    #[serde(rename = "posList", default)]
    pub pos_list: Vec<Position>,
    /// Source feature the link was built from, when the builder kept it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<serde_json::Value>,
}

/// Read-only snapshot of the waterway graph.
///
/// Maps are ordered by identifier so that prefix lookups resolve the same way
/// on every run.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: BTreeMap<String, Junction>,
    links: BTreeMap<String, Link>,
    locators: BTreeMap<String, String>,
}

impl Network {
    /// Build a network from junctions keyed by their own name.
    pub fn from_junctions(junctions: impl IntoIterator<Item = Junction>) -> Self {
        let nodes = junctions
            .into_iter()
            .map(|junction| (junction.name.clone(), junction))
            .collect();
        Self {
            nodes,
            ..Self::default()
        }
    }

    pub fn from_parts(
        nodes: BTreeMap<String, Junction>,
        links: BTreeMap<String, Link>,
        locators: BTreeMap<String, String>,
    ) -> Self {
        Self {
            nodes,
            links,
            locators,
        }
    }

    /// Register a display name that resolves to `node`. The first registration
    /// of a name wins.
    pub fn add_locator(&mut self, name: impl Into<String>, node: impl Into<String>) {
        self.locators.entry(name.into()).or_insert_with(|| node.into());
    }

    pub fn node(&self, name: &str) -> Option<&Junction> {
        self.nodes.get(name)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Junction> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn locator_count(&self) -> usize {
        self.locators.len()
    }

    /// Neighbor references that point at junctions missing from the snapshot,
    /// as `(from, missing)` pairs.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        let nodes = &self.nodes;
        nodes
            .values()
            .flat_map(move |junction| {
                junction
                    .neighbors
                    .iter()
                    .filter(move |neighbor| !nodes.contains_key(neighbor.node()))
                    .map(move |neighbor| (junction.name.as_str(), neighbor.node()))
            })
            .collect()
    }

    /// Resolve user input against junction identifiers.
    pub fn resolve(&self, input: &str) -> Option<&Junction> {
        resolve_by_name_or_prefix(&self.nodes, input).map(|(_, junction)| junction)
    }

    /// Resolve user input against locator names and junction identifiers.
    ///
    /// Exact matches are tried first (locator, then junction), then
    /// case-insensitive prefixes in the same order.
    pub fn locate(&self, input: &str) -> Option<&Junction> {
        let via_locator = |(_, node): (&String, &String)| self.nodes.get(node);

        exact_match(&self.locators, input)
            .and_then(via_locator)
            .or_else(|| exact_match(&self.nodes, input).map(|(_, junction)| junction))
            .or_else(|| prefix_match(&self.locators, input).and_then(via_locator))
            .or_else(|| prefix_match(&self.nodes, input).map(|(_, junction)| junction))
    }

    /// Like [`Network::locate`] but reports a miss as [`Error::UnknownNode`]
    /// with the closest known names attached.
    pub fn locate_or_suggest(&self, input: &str) -> Result<&Junction> {
        self.locate(input).ok_or_else(|| Error::UnknownNode {
            name: input.to_string(),
            suggestions: self.fuzzy_matches(input, 3),
        })
    }

    /// Known names most similar to `input`, best first.
    ///
    /// Locator names are preferred; junction identifiers are only searched
    /// when the snapshot carries no locators.
    pub fn fuzzy_matches(&self, input: &str, limit: usize) -> Vec<String> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let candidates: Vec<&String> = if self.locators.is_empty() {
            self.nodes.keys().collect()
        } else {
            self.locators.keys().collect()
        };

        let mut scored: Vec<(f64, &String)> = candidates
            .into_iter()
            .map(|name| {
                let score = strsim::normalized_damerau_levenshtein(&needle, &name.to_lowercase());
                (score, name)
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.clone())
            .collect()
    }
}

/// Look up `input` by exact key, falling back to the first key (in map
/// order) that starts with `input` ignoring case. Blank input never matches.
pub fn resolve_by_name_or_prefix<'a, V>(
    map: &'a BTreeMap<String, V>,
    input: &str,
) -> Option<(&'a String, &'a V)> {
    exact_match(map, input).or_else(|| prefix_match(map, input))
}

fn exact_match<'a, V>(map: &'a BTreeMap<String, V>, input: &str) -> Option<(&'a String, &'a V)> {
    if input.trim().is_empty() {
        return None;
    }
    map.get_key_value(input)
}

fn prefix_match<'a, V>(map: &'a BTreeMap<String, V>, input: &str) -> Option<(&'a String, &'a V)> {
    if input.trim().is_empty() {
        return None;
    }
    let prefix = input.to_lowercase();
    map.iter()
        .find(|(key, _)| key.to_lowercase().starts_with(&prefix))
}
