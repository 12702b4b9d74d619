//! Route command handler for planning paths between two locations.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use canalnav_lib::{
    plan_route, plan_route_within, CoordinateOrder, Error as RouteError, Network, RouteRequest,
    RouteSummary,
};

use super::format_unknown_location_message;
use crate::output::OutputFormat;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Starting location name or junction id.
    pub from: String,
    /// Destination location name or junction id.
    pub to: String,
    pub order: CoordinateOrder,
    /// Optional wall-clock budget for the search, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl RouteCommandArgs {
    /// Convert CLI args to a library RouteRequest.
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest::new(self.from.clone(), self.to.clone()).with_order(self.order)
    }
}

/// Handle the route subcommand.
pub fn handle_route_command(
    network: Network,
    args: &RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let request = args.to_request();
    let result = match args.timeout_ms {
        Some(ms) => plan_route_within(Arc::new(network), request, Duration::from_millis(ms)),
        None => plan_route(&network, &request),
    };

    let plan = match result {
        Ok(plan) => plan,
        Err(err) => return Err(handle_route_failure(err)),
    };

    let summary =
        RouteSummary::from_plan(&plan).context("failed to build route summary for display")?;
    format.render_route(&summary)
}

fn handle_route_failure(err: RouteError) -> anyhow::Error {
    match err {
        RouteError::UnknownNode { name, suggestions } => {
            anyhow::anyhow!(format_unknown_location_message(&name, &suggestions))
        }
        RouteError::RouteNotFound { start, goal } => {
            anyhow::anyhow!("No route found between {} and {}.", start, goal)
        }
        RouteError::SearchTimedOut {
            start,
            goal,
            budget_ms,
        } => anyhow::anyhow!(
            "Route search timed out after {}ms between {} and {}. Try a larger --timeout-ms.",
            budget_ms,
            start,
            goal
        ),
        other => anyhow::Error::new(other),
    }
}
