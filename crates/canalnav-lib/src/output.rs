//! Serialisable route summaries and their text renderings.

use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::geodesic::{CoordinateOrder, Position};
use crate::plan::{present_steps, PlanEntry, PresentedStep};
use crate::routing::RoutePlan;

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Every junction on the route, one per line.
    PlainText,
    /// One line per waterway joined.
    Plan,
    /// Pretty-printed JSON document.
    Json,
}

/// Endpoint within a planned route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteEndpoint {
    pub id: String,
    pub position: Position,
}

/// Structured representation of a planned route that higher-level consumers
/// can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub hops: usize,
    pub distance_km: f64,
    /// Coordinate order of every `position` in this summary.
    pub order: CoordinateOrder,
    pub start: RouteEndpoint,
    pub goal: RouteEndpoint,
    pub steps: Vec<PresentedStep>,
    pub plan: Vec<PlanEntry>,
}

impl RouteSummary {
    /// Convert a [`RoutePlan`] into a summary with positions in display order.
    pub fn from_plan(plan: &RoutePlan) -> Result<Self> {
        let steps = present_steps(&plan.steps);
        let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
            return Err(Error::EmptyRoutePlan);
        };

        let start = RouteEndpoint {
            id: first.name.clone(),
            position: first.position,
        };
        let goal = RouteEndpoint {
            id: last.name.clone(),
            position: last.position,
        };

        Ok(Self {
            hops: plan.hop_count(),
            distance_km: plan.distance_km,
            order: plan.order.reversed(),
            start,
            goal,
            steps,
            plan: plan.plan.clone(),
        })
    }

    /// Render the summary using the requested mode.
    pub fn render(&self, mode: RouteRenderMode) -> Result<String> {
        match mode {
            RouteRenderMode::PlainText => Ok(self.render_plain()),
            RouteRenderMode::Plan => Ok(self.render_plan()),
            RouteRenderMode::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route: {} -> {} ({} hops, {:.2} km)",
            self.start.id, self.goal.id, self.hops, self.distance_km
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>3}: {} [{:.6}, {:.6}] via {}",
                step.index,
                step.name,
                step.position[0],
                step.position[1],
                step.link.as_deref().unwrap_or("-")
            );
        }
        buffer
    }

    fn render_plan(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Plan: {} -> {} ({:.2} km)",
            self.start.id, self.goal.id, self.distance_km
        );
        if self.plan.is_empty() {
            let _ = writeln!(buffer, "  already at destination");
        }
        for (index, entry) in self.plan.iter().enumerate() {
            let _ = writeln!(
                buffer,
                "{:>3}. {} from {}",
                index + 1,
                entry.link_name,
                entry.arrival
            );
        }
        buffer
    }
}
