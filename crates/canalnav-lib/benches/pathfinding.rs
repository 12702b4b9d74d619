use canalnav_lib::{
    find_path, plan_route, CoordinateOrder, Geodesic, GraphNeighbors, Junction, LinkedReconstruct,
    NameKey, NeighborRef, Network, RouteRequest,
};
use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use std::hint::black_box;

const GRID: usize = 40;
const SPACING_DEG: f64 = 0.001;

fn node_id(row: usize, col: usize) -> String {
    format!("r{row}#{col};{row},{col}")
}

/// Square lattice of junctions around central Amsterdam. Rows are joined by
/// one link per row, columns by one link per column.
fn grid_network() -> Network {
    let mut junctions = Vec::with_capacity(GRID * GRID);
    for row in 0..GRID {
        for col in 0..GRID {
            let mut neighbors = Vec::new();
            if col > 0 {
                neighbors.push(NeighborRef::new(format!("row{row}#0"), node_id(row, col - 1)));
            }
            if col + 1 < GRID {
                neighbors.push(NeighborRef::new(format!("row{row}#0"), node_id(row, col + 1)));
            }
            if row > 0 {
                neighbors.push(NeighborRef::new(format!("col{col}#0"), node_id(row - 1, col)));
            }
            if row + 1 < GRID {
                neighbors.push(NeighborRef::new(format!("col{col}#0"), node_id(row + 1, col)));
            }
            junctions.push(Junction {
                name: node_id(row, col),
                pos: [
                    4.88 + col as f64 * SPACING_DEG,
                    52.36 + row as f64 * SPACING_DEG,
                ],
                neighbors,
            });
        }
    }

    let mut network = Network::from_junctions(junctions);
    network.add_locator("corner-sw", node_id(0, 0));
    network.add_locator("corner-ne", node_id(GRID - 1, GRID - 1));
    network
}

static NETWORK: Lazy<Network> = Lazy::new(grid_network);
static CORNER_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::new("corner-sw", "corner-ne"));

fn benchmark_pathfinding(c: &mut Criterion) {
    let network = &*NETWORK;

    c.bench_function("plan_route_grid_corners", |b| {
        let request = &*CORNER_REQUEST;
        b.iter(|| {
            let plan = plan_route(network, request).expect("route exists");
            black_box(plan.hop_count())
        });
    });

    c.bench_function("find_path_grid_corners", |b| {
        let start = network.locate("corner-sw").expect("start exists");
        let goal = network.locate("corner-ne").expect("goal exists");
        let distance = Geodesic::new(CoordinateOrder::LonLat);
        let neighbors = GraphNeighbors::new(network);
        b.iter(|| {
            let steps = find_path(
                &start,
                &goal,
                &NameKey,
                &distance,
                &neighbors,
                &LinkedReconstruct,
            )
            .expect("search succeeds");
            black_box(steps.map(|steps| steps.len()))
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
