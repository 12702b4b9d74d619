//! Generic A* search over caller-defined graphs.
//!
//! The engine knows nothing about the shape of a node. Everything it needs is
//! supplied through four strategies:
//!
//! - [`KeyOf`] maps a node to the identity used for score bookkeeping.
//! - [`DistanceOf`] prices a hop between adjacent nodes and doubles as the
//!   heuristic estimate towards the goal.
//! - [`NeighborsOf`] expands a node into its adjacent nodes.
//! - [`Reconstruct`] turns the predecessor map into whatever path shape the
//!   caller wants once the goal has been reached.
//!
//! Plain closures and `fn` items implement each trait, so small graphs can be
//! searched without declaring any types:
//!
//! ```
//! use canalnav_lib::search::{find_path, NodeChain};
//! use canalnav_lib::Result;
//!
//! fn key(node: &u32) -> u32 {
//!     *node
//! }
//!
//! let distance = |a: &u32, b: &u32| f64::from(a.abs_diff(*b));
//! let neighbors = |node: &u32| -> Result<Vec<u32>> { Ok(vec![node + 1]) };
//!
//! let path = find_path(&0u32, &3u32, &key, &distance, &neighbors, &NodeChain::new(key))
//!     .expect("search runs");
//! assert_eq!(path, Some(vec![0, 1, 2, 3]));
//! ```
//!
//! A search that exhausts its frontier yields `Ok(None)`. Errors are reserved
//! for strategies that fail, such as a neighbor reference that cannot be
//! resolved.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use tracing::debug;

use crate::error::Result;

/// Maps a node to the identity used to index score maps.
///
/// Keys must be unique over the nodes reachable in one search; two distinct
/// nodes with equal keys are scored as the same node.
pub trait KeyOf<N> {
    type Key: Eq + Hash + Clone;

    fn key_of(&self, node: &N) -> Self::Key;
}

impl<N, K, F> KeyOf<N> for F
where
    F: Fn(&N) -> K,
    K: Eq + Hash + Clone,
{
    type Key = K;

    fn key_of(&self, node: &N) -> K {
        self(node)
    }
}

/// Non-negative cost between two nodes.
///
/// Used both as the edge weight between adjacent nodes and as the estimate
/// from a node to the goal, so it must never overestimate the remaining cost
/// for the returned path to be optimal.
pub trait DistanceOf<N> {
    fn distance(&self, from: &N, to: &N) -> f64;
}

impl<N, F> DistanceOf<N> for F
where
    F: Fn(&N, &N) -> f64,
{
    fn distance(&self, from: &N, to: &N) -> f64 {
        self(from, to)
    }
}

/// Expands a node into the nodes reachable in one hop.
pub trait NeighborsOf<N> {
    fn neighbors_of(&self, node: &N) -> Result<Vec<N>>;
}

impl<N, F> NeighborsOf<N> for F
where
    F: Fn(&N) -> Result<Vec<N>>,
{
    fn neighbors_of(&self, node: &N) -> Result<Vec<N>> {
        self(node)
    }
}

/// Builds the final path once the goal has been dequeued.
pub trait Reconstruct<K, N> {
    type Path;

    fn reconstruct(&self, came_from: &CameFrom<K, N>, goal: &N) -> Result<Self::Path>;
}

impl<K, N, P, F> Reconstruct<K, N> for F
where
    F: Fn(&CameFrom<K, N>, &N) -> Result<P>,
{
    type Path = P;

    fn reconstruct(&self, came_from: &CameFrom<K, N>, goal: &N) -> Result<P> {
        self(came_from, goal)
    }
}

/// Predecessor map recorded during a search.
///
/// Every visited key except the start's maps to the node it was best reached
/// from. Entries are only written on a strict improvement, so following them
/// from any visited node ends at the start.
#[derive(Debug, Clone)]
pub struct CameFrom<K, N> {
    entries: HashMap<K, N>,
}

impl<K, N> CameFrom<K, N>
where
    K: Eq + Hash,
{
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn record(&mut self, key: K, predecessor: N) {
        self.entries.insert(key, predecessor);
    }

    /// Node from which `key` was best reached, if any.
    pub fn predecessor(&self, key: &K) -> Option<&N> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow predecessors from `terminal` back to the start and return the
    /// chain in start-to-terminal order.
    pub fn walk<'a, KO>(&'a self, key_of: &KO, terminal: &'a N) -> Vec<&'a N>
    where
        KO: KeyOf<N, Key = K>,
    {
        let mut chain = vec![terminal];
        let mut current = terminal;
        while let Some(previous) = self.entries.get(&key_of.key_of(current)) {
            // Only reachable with negative edge costs.
            if chain.len() > self.entries.len() {
                break;
            }
            chain.push(previous);
            current = previous;
        }
        chain.reverse();
        chain
    }
}

/// Reconstruction strategy that returns the bare node sequence.
#[derive(Debug, Clone, Copy)]
pub struct NodeChain<KO> {
    key_of: KO,
}

impl<KO> NodeChain<KO> {
    pub fn new(key_of: KO) -> Self {
        Self { key_of }
    }
}

impl<N, KO> Reconstruct<KO::Key, N> for NodeChain<KO>
where
    N: Clone,
    KO: KeyOf<N>,
{
    type Path = Vec<N>;

    fn reconstruct(&self, came_from: &CameFrom<KO::Key, N>, goal: &N) -> Result<Vec<N>> {
        Ok(came_from
            .walk(&self.key_of, goal)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Result of [`search`] including the bookkeeping that produced it.
#[derive(Debug, Clone)]
pub struct SearchReport<K, P> {
    /// Reconstructed path, or `None` when the goal is unreachable.
    pub path: Option<P>,
    /// Best known cost from the start for every key the search touched.
    pub g_score: HashMap<K, f64>,
    /// Number of nodes whose neighbors were expanded.
    pub expanded: usize,
}

/// Run A* from `start` to `goal` and return the reconstructed path.
///
/// The goal is detected by comparing each dequeued node against `goal` with
/// `PartialEq`, not by key. On success the value produced by `reconstruct` is
/// returned unchanged; an exhausted frontier returns `Ok(None)`.
pub fn find_path<N, KO, D, NB, R>(
    start: &N,
    goal: &N,
    key_of: &KO,
    distance: &D,
    neighbors_of: &NB,
    reconstruct: &R,
) -> Result<Option<R::Path>>
where
    N: Clone + PartialEq,
    KO: KeyOf<N>,
    D: DistanceOf<N>,
    NB: NeighborsOf<N>,
    R: Reconstruct<KO::Key, N>,
{
    search(start, goal, key_of, distance, neighbors_of, reconstruct).map(|report| report.path)
}

/// Same as [`find_path`] but also returns the g-scores and expansion count.
pub fn search<N, KO, D, NB, R>(
    start: &N,
    goal: &N,
    key_of: &KO,
    distance: &D,
    neighbors_of: &NB,
    reconstruct: &R,
) -> Result<SearchReport<KO::Key, R::Path>>
where
    N: Clone + PartialEq,
    KO: KeyOf<N>,
    D: DistanceOf<N>,
    NB: NeighborsOf<N>,
    R: Reconstruct<KO::Key, N>,
{
    let mut g_score: HashMap<KO::Key, f64> = HashMap::new();
    let mut came_from = CameFrom::new();
    let mut frontier = Frontier::new();
    let mut expanded = 0usize;

    g_score.insert(key_of.key_of(start), 0.0);
    frontier.push(start.clone(), 0.0, distance.distance(start, goal));

    while let Some(entry) = frontier.pop() {
        let current = entry.node;
        let current_key = key_of.key_of(&current);
        let current_g = match g_score.get(&current_key) {
            Some(&best) if best < entry.cost => continue,
            Some(&best) => best,
            None => continue,
        };

        if current == *goal {
            let path = reconstruct.reconstruct(&came_from, &current)?;
            debug!(
                expanded,
                frontier = frontier.len(),
                cost = current_g,
                "goal reached"
            );
            return Ok(SearchReport {
                path: Some(path),
                g_score,
                expanded,
            });
        }

        expanded += 1;
        for neighbor in neighbors_of.neighbors_of(&current)? {
            let tentative_g = current_g + distance.distance(&current, &neighbor);
            let neighbor_key = key_of.key_of(&neighbor);
            let known = g_score
                .get(&neighbor_key)
                .copied()
                .unwrap_or(f64::INFINITY);

            if tentative_g < known {
                g_score.insert(neighbor_key.clone(), tentative_g);
                came_from.record(neighbor_key, current.clone());
                let estimate = tentative_g + distance.distance(&neighbor, goal);
                frontier.push(neighbor, tentative_g, estimate);
            }
        }
    }

    debug!(expanded, "frontier exhausted without reaching goal");
    Ok(SearchReport {
        path: None,
        g_score,
        expanded,
    })
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Min-heap of open nodes ordered by estimate, then insertion order.
struct Frontier<N> {
    heap: BinaryHeap<FrontierEntry<N>>,
    sequence: u64,
}

impl<N> Frontier<N> {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }

    fn push(&mut self, node: N, cost: f64, estimate: f64) {
        self.heap.push(FrontierEntry {
            estimate: FloatOrd(estimate),
            sequence: self.sequence,
            cost,
            node,
        });
        self.sequence += 1;
    }

    fn pop(&mut self) -> Option<FrontierEntry<N>> {
        self.heap.pop()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

struct FrontierEntry<N> {
    estimate: FloatOrd,
    sequence: u64,
    cost: f64,
    node: N,
}

impl<N> Ord for FrontierEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl<N> PartialOrd for FrontierEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> PartialEq for FrontierEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for FrontierEntry<N> {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::Error;

    type Node = &'static str;

    /// Undirected weighted graph. Pairs without an edge are priced at a fixed
    /// heuristic value, which is zero unless a test overrides it.
    struct TestGraph {
        edges: HashMap<Node, Vec<(Node, f64)>>,
        heuristic: f64,
    }

    impl TestGraph {
        fn new(edges: &[(Node, Node, f64)]) -> Self {
            let mut adjacency: HashMap<Node, Vec<(Node, f64)>> = HashMap::new();
            for &(a, b, weight) in edges {
                adjacency.entry(a).or_default().push((b, weight));
                adjacency.entry(b).or_default().push((a, weight));
            }
            Self {
                edges: adjacency,
                heuristic: 0.0,
            }
        }

        fn with_heuristic(mut self, heuristic: f64) -> Self {
            self.heuristic = heuristic;
            self
        }

        fn weight(&self, from: Node, to: Node) -> Option<f64> {
            self.edges
                .get(from)?
                .iter()
                .find(|(target, _)| *target == to)
                .map(|(_, weight)| *weight)
        }

        fn path_cost(&self, path: &[Node]) -> f64 {
            path.windows(2)
                .map(|pair| self.weight(pair[0], pair[1]).expect("hop is an edge"))
                .sum()
        }
    }

    impl DistanceOf<Node> for TestGraph {
        fn distance(&self, from: &Node, to: &Node) -> f64 {
            if from == to {
                return 0.0;
            }
            self.weight(*from, *to).unwrap_or(self.heuristic)
        }
    }

    impl NeighborsOf<Node> for TestGraph {
        fn neighbors_of(&self, node: &Node) -> Result<Vec<Node>> {
            Ok(self
                .edges
                .get(node)
                .map(|edges| edges.iter().map(|(target, _)| *target).collect())
                .unwrap_or_default())
        }
    }

    fn key(node: &Node) -> Node {
        *node
    }

    fn run(graph: &TestGraph, start: Node, goal: Node) -> Option<Vec<Node>> {
        find_path(&start, &goal, &key, graph, graph, &NodeChain::new(key)).expect("search runs")
    }

    fn line() -> TestGraph {
        TestGraph::new(&[("S", "A", 1.0), ("A", "B", 1.0), ("B", "G", 1.0)])
    }

    #[test]
    fn line_graph_returns_every_hop() {
        let graph = line();
        let path = run(&graph, "S", "G").expect("route exists");
        assert_eq!(path, vec!["S", "A", "B", "G"]);
        assert_eq!(graph.path_cost(&path), 3.0);
    }

    #[test]
    fn removed_edge_yields_no_path() {
        let graph = TestGraph::new(&[("S", "A", 1.0), ("A", "B", 1.0), ("G", "X", 1.0)]);
        assert_eq!(run(&graph, "S", "G"), None);
    }

    #[test]
    fn start_equal_to_goal_is_single_node() {
        let graph = line();
        let report = search(&"A", &"A", &key, &graph, &graph, &NodeChain::new(key))
            .expect("search runs");
        assert_eq!(report.path, Some(vec!["A"]));
        assert_eq!(report.expanded, 0);
    }

    #[test]
    fn isolated_start_yields_no_path() {
        let graph = line();
        assert_eq!(run(&graph, "Lonely", "G"), None);
    }

    #[test]
    fn prefers_cheaper_route_with_more_hops() {
        let graph = TestGraph::new(&[
            ("S", "G", 10.0),
            ("S", "A", 2.0),
            ("A", "B", 2.0),
            ("B", "G", 2.0),
        ]);
        let path = run(&graph, "S", "G").expect("route exists");
        assert_eq!(path, vec!["S", "A", "B", "G"]);
        assert_eq!(graph.path_cost(&path), 6.0);
    }

    #[test]
    fn improves_previously_discovered_node() {
        // C is first discovered through the expensive edge from S and later
        // improved through A.
        let graph = TestGraph::new(&[
            ("S", "C", 5.0),
            ("S", "A", 1.0),
            ("A", "C", 1.0),
            ("C", "G", 1.0),
        ]);
        let report = search(&"S", &"G", &key, &graph, &graph, &NodeChain::new(key))
            .expect("search runs");
        assert_eq!(report.path, Some(vec!["S", "A", "C", "G"]));
        assert_eq!(report.g_score["C"], 2.0);
        assert_eq!(report.g_score["G"], 3.0);
    }

    #[test]
    fn g_scores_are_non_decreasing_along_path() {
        let graph = TestGraph::new(&[
            ("S", "A", 1.5),
            ("A", "B", 0.5),
            ("S", "B", 3.0),
            ("B", "C", 2.0),
            ("C", "G", 1.0),
        ]);
        let report = search(&"S", &"G", &key, &graph, &graph, &NodeChain::new(key))
            .expect("search runs");
        let path = report.path.expect("route exists");
        let scores: Vec<f64> = path.iter().map(|node| report.g_score[node]).collect();

        assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(*scores.last().unwrap(), graph.path_cost(&path));
        assert_eq!(graph.path_cost(&path), 5.0);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let graph = TestGraph::new(&[
            ("S", "A", 1.0),
            ("S", "B", 1.0),
            ("A", "G", 1.0),
            ("B", "G", 1.0),
        ]);
        let first = run(&graph, "S", "G");
        let second = run(&graph, "S", "G");
        assert_eq!(first, second);
    }

    #[test]
    fn equal_estimates_expand_in_insertion_order() {
        let graph = TestGraph::new(&[
            ("S", "A", 1.0),
            ("S", "B", 1.0),
            ("A", "G", 1.0),
            ("B", "G", 1.0),
        ]);
        assert_eq!(run(&graph, "S", "G"), Some(vec!["S", "A", "G"]));
    }

    #[test]
    fn overestimating_heuristic_still_finds_a_route() {
        let graph = TestGraph::new(&[
            ("S", "A", 1.0),
            ("A", "B", 1.0),
            ("B", "G", 1.0),
            ("S", "C", 4.0),
            ("C", "G", 4.0),
        ])
        .with_heuristic(100.0);
        let path = run(&graph, "S", "G").expect("route exists");
        assert_eq!(path.first(), Some(&"S"));
        assert_eq!(path.last(), Some(&"G"));
    }

    #[test]
    fn overestimating_heuristic_never_reports_missing_route() {
        let graph = line().with_heuristic(1_000.0);
        assert!(run(&graph, "S", "G").is_some());
    }

    #[test]
    fn neighbor_errors_propagate() {
        let neighbors = |node: &Node| -> Result<Vec<Node>> {
            Err(Error::MissingNode {
                from: node.to_string(),
                name: "ghost".to_string(),
            })
        };
        let distance = |_: &Node, _: &Node| 1.0;

        let err = find_path(&"S", &"G", &key, &distance, &neighbors, &NodeChain::new(key))
            .expect_err("missing neighbor fails");
        assert!(matches!(err, Error::MissingNode { .. }));
    }

    #[test]
    fn reconstruction_output_is_returned_unchanged() {
        let graph = line();
        let hops = |came_from: &CameFrom<Node, Node>, goal: &Node| -> Result<usize> {
            Ok(came_from.walk(&key, goal).len() - 1)
        };
        let result = find_path(&"S", &"G", &key, &graph, &graph, &hops).expect("search runs");
        assert_eq!(result, Some(3));
    }

    #[test]
    fn came_from_has_no_entry_for_start() {
        let graph = line();
        let check = |came_from: &CameFrom<Node, Node>, _: &Node| -> Result<bool> {
            Ok(came_from.predecessor(&"S").is_none() && came_from.len() == 3)
        };
        let result = find_path(&"S", &"G", &key, &graph, &graph, &check).expect("search runs");
        assert_eq!(result, Some(true));
    }
}
