//! Route planning on top of the generic search kernel.
//!
//! [`plan_route`] resolves user supplied names, runs A* with the reference
//! strategies and derives the plan. [`plan_route_within`] does the same under
//! a wall-clock budget.
//!
//! # Example
//!
//! ```ignore
//! use canalnav_lib::{load_network, plan_route, RouteRequest};
//!
//! let network = load_network(Path::new("data"))?;
//! let plan = plan_route(&network, &RouteRequest::new("Herengracht", "Keizersgracht"))?;
//! println!("{} hops, {:.2} km", plan.hop_count(), plan.distance_km);
//! ```

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geodesic::{CoordinateOrder, Geodesic};
use crate::network::Network;
use crate::plan::{derive_plan, route_length_km, PlanEntry};
use crate::search::search;
use crate::strategy::{GraphNeighbors, LinkedReconstruct, NameKey, RouteStep};

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub from: String,
    pub to: String,
    pub order: CoordinateOrder,
}

impl RouteRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            order: CoordinateOrder::default(),
        }
    }

    /// Override the coordinate order of the stored positions.
    pub fn with_order(mut self, order: CoordinateOrder) -> Self {
        self.order = order;
        self
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    /// Identifier of the resolved start junction.
    pub start: String,
    /// Identifier of the resolved goal junction.
    pub goal: String,
    pub order: CoordinateOrder,
    pub steps: Vec<RouteStep>,
    pub distance_km: f64,
    pub plan: Vec<PlanEntry>,
}

impl RoutePlan {
    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Compute the shortest route for `request`.
///
/// Unknown names fail with [`Error::UnknownNode`]; an unreachable goal fails
/// with [`Error::RouteNotFound`].
pub fn plan_route(network: &Network, request: &RouteRequest) -> Result<RoutePlan> {
    let start = network.locate_or_suggest(&request.from)?;
    let goal = network.locate_or_suggest(&request.to)?;
    debug!(start = %start.name, goal = %goal.name, order = %request.order, "planning route");

    let report = search(
        &start,
        &goal,
        &NameKey,
        &Geodesic::new(request.order),
        &GraphNeighbors::new(network),
        &LinkedReconstruct,
    )?;

    let Some(steps) = report.path else {
        debug!(expanded = report.expanded, "no route between endpoints");
        return Err(Error::RouteNotFound {
            start: request.from.clone(),
            goal: request.to.clone(),
        });
    };

    let distance_km = route_length_km(&steps, request.order);
    let plan = derive_plan(&steps);
    debug!(
        hops = steps.len().saturating_sub(1),
        expanded = report.expanded,
        distance_km,
        "route planned"
    );

    Ok(RoutePlan {
        start: start.name.clone(),
        goal: goal.name.clone(),
        order: request.order,
        steps,
        distance_km,
        plan,
    })
}

/// Like [`plan_route`], but gives up after `budget`.
///
/// Expiry is reported as [`Error::SearchTimedOut`], never as
/// [`Error::RouteNotFound`]. The search itself is not interrupted: it keeps
/// running on its worker thread and the late result is dropped.
pub fn plan_route_within(
    network: Arc<Network>,
    request: RouteRequest,
    budget: Duration,
) -> Result<RoutePlan> {
    let start = request.from.clone();
    let goal = request.to.clone();
    run_with_deadline(budget, move || plan_route(&network, &request), move || {
        Error::SearchTimedOut {
            start,
            goal,
            budget_ms: budget.as_millis(),
        }
    })
}

fn run_with_deadline<T, J, E>(budget: Duration, job: J, on_timeout: E) -> Result<T>
where
    T: Send + 'static,
    J: FnOnce() -> Result<T> + Send + 'static,
    E: FnOnce() -> Error,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone once the deadline has passed.
        let _ = sender.send(job());
    });

    match receiver.recv_timeout(budget) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            let err = on_timeout();
            warn!(budget_ms = budget.as_millis() as u64, "{err}");
            Err(err)
        }
        Err(RecvTimeoutError::Disconnected) => Err(Error::SearchAborted),
    }
}
