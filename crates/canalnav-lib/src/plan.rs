//! Post-processing of reconstructed routes.
//!
//! Two independent steps operate on the output of
//! [`LinkedReconstruct`](crate::strategy::LinkedReconstruct):
//!
//! - [`present_steps`] converts stored positions into display order.
//! - [`derive_plan`] reduces a route to one instruction per waterway joined.

use serde::Serialize;

use crate::geodesic::{haversine_km, CoordinateOrder, Position};
use crate::strategy::RouteStep;

/// Separator between a link name and its fragment suffix.
const FRAGMENT_SEPARATOR: char = '#';

/// A route step ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentedStep {
    pub index: usize,
    pub name: String,
    /// Position in display order (the reverse of storage order).
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// One instruction of a route plan: join `link_name`, arriving at `arrival`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub link_name: String,
    pub arrival: String,
}

/// Swap the two elements of a coordinate pair.
pub fn reverse_position(position: Position) -> Position {
    [position[1], position[0]]
}

/// Convert route steps to display form, reversing every stored position.
pub fn present_steps(steps: &[RouteStep]) -> Vec<PresentedStep> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| PresentedStep {
            index,
            name: step.node.name.clone(),
            position: reverse_position(step.node.pos),
            link: step.link.clone(),
        })
        .collect()
}

/// Link identifier without its `#fragment` suffix.
pub fn link_name(link_id: &str) -> &str {
    link_id
        .split_once(FRAGMENT_SEPARATOR)
        .map_or(link_id, |(name, _)| name)
}

/// Collapse consecutive steps along the same link into single plan entries.
///
/// Each entry is labelled with the link name and the node where that link was
/// first reached. A link that reappears after a different one starts a new
/// entry.
pub fn derive_plan(steps: &[RouteStep]) -> Vec<PlanEntry> {
    let mut plan: Vec<PlanEntry> = Vec::new();

    for step in steps {
        let Some(link) = step.link.as_deref() else {
            continue;
        };
        let name = link_name(link);
        if plan.last().is_some_and(|entry| entry.link_name == name) {
            continue;
        }
        plan.push(PlanEntry {
            link_name: name.to_string(),
            arrival: step.node.name.clone(),
        });
    }

    plan
}

/// Total great-circle length of a route in kilometres.
pub fn route_length_km(steps: &[RouteStep], order: CoordinateOrder) -> f64 {
    steps
        .windows(2)
        .map(|pair| haversine_km(pair[0].node.pos, pair[1].node.pos, order))
        .sum()
}
