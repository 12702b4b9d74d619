//! Canalnav library entry points.
//!
//! This crate exposes a generic A* kernel ([`find_path`]) parameterised by
//! caller supplied strategies, plus the reference strategies used to route
//! over a canal network snapshot: geodesic distance, name keys, graph
//! neighbors and link-aware reconstruction. Snapshots are built from GeoJSON
//! feature collections with [`build_from_path`]. Higher-level consumers (the
//! CLI) should only depend on the functions exported here instead of
//! reimplementing behavior.

pub mod builder;
pub mod dataset;
pub mod error;
pub mod geodesic;
pub mod network;
pub mod output;
pub mod plan;
pub mod routing;
pub mod search;
pub mod strategy;

pub use builder::{build_from_path, build_snapshot, BuildOptions, Snapshot};
pub use dataset::{
    default_data_dir, load_network, load_network_from, parse_graph, resolve_data_dir,
    write_snapshot, DatasetPaths, Locator, DATA_DIR_ENV,
};
pub use error::{Error, Result};
pub use geodesic::{geodesic_distance, haversine_km, CoordinateOrder, Geodesic, Position};
pub use network::{resolve_by_name_or_prefix, Junction, Link, NeighborRef, Network};
pub use output::{RouteRenderMode, RouteSummary};
pub use plan::{derive_plan, present_steps, PlanEntry, PresentedStep};
pub use routing::{plan_route, plan_route_within, RoutePlan, RouteRequest};
pub use search::{
    find_path, search, CameFrom, DistanceOf, KeyOf, NeighborsOf, NodeChain, Reconstruct,
    SearchReport,
};
pub use strategy::{GraphNeighbors, LinkedReconstruct, NameKey, RouteStep};
