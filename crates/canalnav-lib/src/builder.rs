//! Builds a network snapshot from a GeoJSON feature collection.
//!
//! Every named feature becomes one link. Each coordinate of a link becomes a
//! junction joined to the next coordinate (and the previous one unless the
//! feature is marked `oneway`). Coordinates of other links that lie within the
//! distance tolerance are joined too, which is how waterways meet. Nearby
//! coordinates are found with a KD-tree over the distinct coordinates of the
//! collection.

use std::collections::{btree_map, hash_map, BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::dataset::{write_snapshot, DatasetPaths, Locator};
use crate::error::{Error, Result};
use crate::geodesic::Position;
use crate::network::{Junction, Link, NeighborRef, Network};

/// Tolerance, in coordinate units, below which two coordinates meet.
pub const DEFAULT_DIST_TOLERANCE: f64 = 0.000005;

/// Waterway vertices often share one axis value, so buckets are kept large.
const BUCKET_SIZE: usize = 256;

/// Options for [`build_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Euclidean distance, in coordinate units, within which coordinates of
    /// different links are joined. Negative values behave like zero.
    pub dist_tolerance: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            dist_tolerance: DEFAULT_DIST_TOLERANCE,
        }
    }
}

/// The three collections of a snapshot, ready to be written or loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub graph: BTreeMap<String, Junction>,
    pub links: BTreeMap<String, Link>,
    pub locators: Vec<Locator>,
}

impl Snapshot {
    pub fn into_network(self) -> Network {
        let mut network = Network::from_parts(self.graph, self.links, BTreeMap::new());
        for locator in self.locators {
            network.add_locator(locator.name, locator.value);
        }
        network
    }

    /// Write the snapshot files into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<DatasetPaths> {
        write_snapshot(dir, &self.graph, &self.links, &self.locators)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum Geometry {
    Point(Vec<f64>),
    MultiPoint(Vec<Vec<f64>>),
    LineString(Vec<Vec<f64>>),
    MultiLineString(Vec<Vec<Vec<f64>>>),
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

impl Geometry {
    /// Flat coordinate list. Rings and parts are concatenated in order.
    fn positions(self) -> Vec<Position> {
        let coords: Vec<Vec<f64>> = match self {
            Geometry::Point(point) => vec![point],
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points,
            Geometry::MultiLineString(parts) | Geometry::Polygon(parts) => {
                parts.into_iter().flatten().collect()
            }
            Geometry::MultiPolygon(polygons) => polygons.into_iter().flatten().flatten().collect(),
        };
        // Altitude, when present, is dropped.
        coords
            .into_iter()
            .filter_map(|coord| match coord.as_slice() {
                [x, y, ..] => Some([*x, *y]),
                _ => None,
            })
            .collect()
    }
}

/// A named feature with its generated link id.
struct Canal {
    id: String,
    name: String,
    oneway: bool,
    positions: Vec<Position>,
    feature: Value,
}

impl Canal {
    fn node_id(&self, pos: &Position) -> String {
        junction_id(&self.id, pos)
    }
}

/// Read a GeoJSON feature collection from `input` and build a snapshot.
pub fn build_from_path(input: &Path, options: &BuildOptions) -> Result<Snapshot> {
    if !input.is_file() {
        return Err(Error::DatasetNotFound {
            path: input.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&contents)?;
    let Some(features) = document.get("features").and_then(Value::as_array) else {
        return Err(Error::InvalidFeatures {
            path: input.to_path_buf(),
            reason: "expected a `features` array".to_string(),
        });
    };
    Ok(build_snapshot(features, options))
}

/// Build a snapshot from GeoJSON features.
///
/// Features without a non-empty `properties.name` are ignored. Link ids are
/// `"{name}#{n}"` where `n` counts named features in input order; junction ids
/// are `"{link_id};{x},{y}"`. Features whose geometry cannot be read are
/// skipped with a warning.
pub fn build_snapshot(features: &[Value], options: &BuildOptions) -> Snapshot {
    let canals = named_canals(features);
    let tolerance = options.dist_tolerance.max(0.0);

    // Distinct coordinates and the canals passing through each of them.
    let mut coords: Vec<Position> = Vec::new();
    let mut coord_index: HashMap<[u64; 2], usize> = HashMap::new();
    let mut passing: Vec<Vec<usize>> = Vec::new();
    for (canal_index, canal) in canals.iter().enumerate() {
        for pos in &canal.positions {
            let index = match coord_index.entry(coord_key(pos)) {
                hash_map::Entry::Occupied(entry) => *entry.get(),
                hash_map::Entry::Vacant(entry) => {
                    coords.push(*pos);
                    passing.push(Vec::new());
                    *entry.insert(coords.len() - 1)
                }
            };
            if !passing[index].contains(&canal_index) {
                passing[index].push(canal_index);
            }
        }
    }

    let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
    for (index, pos) in coords.iter().enumerate() {
        tree.add(pos, index);
    }

    let mut snapshot = Snapshot::default();
    let mut named: HashSet<&str> = HashSet::new();
    for (canal_index, canal) in canals.iter().enumerate() {
        for (i, pos) in canal.positions.iter().enumerate() {
            let node_id = canal.node_id(pos);
            let mut neighbors = Vec::new();

            if let Some(next) = canal.positions.get(i + 1) {
                neighbors.push(NeighborRef::new(&canal.id, canal.node_id(next)));
            }
            if !canal.oneway && i > 0 {
                let previous = &canal.positions[i - 1];
                neighbors.push(NeighborRef::new(&canal.id, canal.node_id(previous)));
            }

            let own = coord_index[&coord_key(pos)];
            let mut nearby: Vec<usize> = tree
                .within::<SquaredEuclidean>(pos, tolerance * tolerance)
                .into_iter()
                .map(|neighbour| neighbour.item)
                .collect();
            nearby.push(own);
            nearby.sort_unstable();
            nearby.dedup();

            for index in nearby {
                for &other_index in &passing[index] {
                    if other_index == canal_index && index == own {
                        continue;
                    }
                    let other = &canals[other_index];
                    neighbors.push(NeighborRef::new(&other.id, other.node_id(&coords[index])));
                }
            }

            match snapshot.graph.entry(node_id.clone()) {
                btree_map::Entry::Occupied(mut entry) => {
                    // The same coordinate appears twice in one link, e.g. a closed ring.
                    entry.get_mut().neighbors.extend(neighbors);
                    dedup_neighbors(entry.get_mut());
                }
                btree_map::Entry::Vacant(entry) => {
                    let junction = entry.insert(Junction {
                        name: node_id.clone(),
                        pos: *pos,
                        neighbors,
                    });
                    dedup_neighbors(junction);
                }
            }

            if named.insert(canal.name.as_str()) {
                snapshot.locators.push(Locator {
                    name: canal.name.clone(),
                    value: node_id,
                });
            }
        }

        snapshot.links.insert(
            canal.id.clone(),
            Link {
                name: canal.name.clone(),
                pos_list: canal.positions.clone(),
                feature: Some(canal.feature.clone()),
            },
        );
    }

    info!(
        features = features.len(),
        links = snapshot.links.len(),
        junctions = snapshot.graph.len(),
        locators = snapshot.locators.len(),
        "built network snapshot"
    );
    snapshot
}

fn named_canals(features: &[Value]) -> Vec<Canal> {
    let mut canals = Vec::new();
    let mut counter = 0usize;
    for feature in features {
        let properties = feature.get("properties");
        let Some(name) = properties
            .and_then(|props| props.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
        else {
            continue;
        };
        let id = format!("{name}#{counter}");
        counter += 1;

        let geometry = feature.get("geometry").cloned().unwrap_or(Value::Null);
        let positions = match Geometry::deserialize(geometry) {
            Ok(geometry) => geometry.positions(),
            Err(err) => {
                warn!(link = %id, error = %err, "skipping feature with unreadable geometry");
                continue;
            }
        };

        canals.push(Canal {
            id,
            name: name.to_string(),
            oneway: properties.and_then(|props| props.get("oneway")).is_some_and(is_oneway),
            positions,
            feature: feature.clone(),
        });
    }
    canals
}

/// OSM-style `oneway` tag: booleans, non-zero numbers, `yes`, `true`, `1`
/// and `-1`.
fn is_oneway(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "1" | "-1"
        ),
        _ => false,
    }
}

fn dedup_neighbors(junction: &mut Junction) {
    let mut seen = HashSet::new();
    let own = junction.name.clone();
    junction
        .neighbors
        .retain(|neighbor| neighbor.node() != own && seen.insert(neighbor.clone()));
}

/// Exact-match key for a coordinate; `-0.0` and `0.0` share a key.
fn coord_key(pos: &Position) -> [u64; 2] {
    [(pos[0] + 0.0).to_bits(), (pos[1] + 0.0).to_bits()]
}

/// `"{link_id};{x},{y}"` with whole numbers written as `4.0`.
pub fn junction_id(link_id: &str, pos: &Position) -> String {
    format!(
        "{link_id};{},{}",
        format_coordinate(pos[0]),
        format_coordinate(pos[1])
    )
}

fn format_coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(name: &str, coords: Value) -> Value {
        json!({
            "type": "Feature",
            "properties": {"name": name},
            "geometry": {"type": "LineString", "coordinates": coords}
        })
    }

    fn neighbor_nodes<'a>(snapshot: &'a Snapshot, id: &str) -> Vec<&'a str> {
        snapshot.graph[id]
            .neighbors
            .iter()
            .map(NeighborRef::node)
            .collect()
    }

    #[test]
    fn consecutive_coordinates_are_joined_both_ways() {
        let features = vec![line("Singel", json!([[4.0, 52.0], [4.5, 52.0], [5.0, 52.0]]))];
        let snapshot = build_snapshot(&features, &BuildOptions::default());

        assert_eq!(snapshot.graph.len(), 3);
        assert_eq!(
            neighbor_nodes(&snapshot, "Singel#0;4.5,52.0"),
            vec!["Singel#0;5.0,52.0", "Singel#0;4.0,52.0"]
        );
        assert_eq!(
            neighbor_nodes(&snapshot, "Singel#0;4.0,52.0"),
            vec!["Singel#0;4.5,52.0"]
        );
        assert_eq!(snapshot.links["Singel#0"].pos_list.len(), 3);
        assert_eq!(
            snapshot.locators,
            vec![Locator {
                name: "Singel".to_string(),
                value: "Singel#0;4.0,52.0".to_string(),
            }]
        );
    }

    #[test]
    fn oneway_links_only_point_forward() {
        let mut feature = line("Sluis", json!([[4.0, 52.0], [4.5, 52.0]]));
        feature["properties"]["oneway"] = json!("yes");
        let snapshot = build_snapshot(&[feature], &BuildOptions::default());

        assert_eq!(neighbor_nodes(&snapshot, "Sluis#0;4.0,52.0"), vec!["Sluis#0;4.5,52.0"]);
        assert!(neighbor_nodes(&snapshot, "Sluis#0;4.5,52.0").is_empty());
    }

    #[test]
    fn links_meet_at_nearby_coordinates() {
        let features = vec![
            line("Singel", json!([[4.0, 52.0], [4.5, 52.0]])),
            line("Spui", json!([[4.500001, 52.0], [4.5, 52.5]])),
        ];
        let snapshot = build_snapshot(&features, &BuildOptions::default());

        assert!(neighbor_nodes(&snapshot, "Singel#0;4.5,52.0").contains(&"Spui#1;4.500001,52.0"));
        assert!(neighbor_nodes(&snapshot, "Spui#1;4.500001,52.0").contains(&"Singel#0;4.5,52.0"));

        let strict = build_snapshot(&features, &BuildOptions { dist_tolerance: 0.0 });
        assert!(!neighbor_nodes(&strict, "Singel#0;4.5,52.0").contains(&"Spui#1;4.500001,52.0"));
    }

    #[test]
    fn unnamed_and_unreadable_features_are_skipped() {
        let features = vec![
            line("", json!([[4.0, 52.0], [4.5, 52.0]])),
            json!({"type": "Feature", "properties": {}, "geometry": null}),
            json!({
                "type": "Feature",
                "properties": {"name": "Ring"},
                "geometry": {"type": "GeometryCollection", "geometries": []}
            }),
            line("Amstel", json!([[4.9, 52.3], [4.9, 52.35]])),
        ];
        let snapshot = build_snapshot(&features, &BuildOptions::default());

        // "Ring" was named, so it still consumed a link number.
        assert_eq!(snapshot.links.keys().collect::<Vec<_>>(), vec!["Amstel#1"]);
        assert_eq!(snapshot.links["Amstel#1"].feature.as_ref().unwrap()["type"], "Feature");
    }

    #[test]
    fn closed_rings_merge_their_repeated_vertex() {
        let feature = json!({
            "type": "Feature",
            "properties": {"name": "Vijver"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }
        });
        let snapshot = build_snapshot(&[feature], &BuildOptions::default());

        assert_eq!(snapshot.graph.len(), 3);
        let mut around = neighbor_nodes(&snapshot, "Vijver#0;0.0,0.0");
        around.sort_unstable();
        assert_eq!(around, vec!["Vijver#0;1.0,0.0", "Vijver#0;1.0,1.0"]);
    }

    #[test]
    fn oneway_tag_values() {
        assert!(is_oneway(&json!(true)));
        assert!(is_oneway(&json!(-1)));
        assert!(is_oneway(&json!("Yes")));
        assert!(!is_oneway(&json!("no")));
        assert!(!is_oneway(&json!(0)));
        assert!(!is_oneway(&Value::Null));
    }

    #[test]
    fn junction_ids_write_whole_numbers_with_a_decimal() {
        assert_eq!(junction_id("Singel#0", &[4.0, 52.37]), "Singel#0;4.0,52.37");
        assert_eq!(junction_id("Singel#0", &[-0.5, 3.0]), "Singel#0;-0.5,3.0");
    }

    #[test]
    fn missing_features_array_is_rejected() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("canals.geojson");
        fs::write(&path, r#"{"type": "FeatureCollection"}"#).unwrap();

        let err = build_from_path(&path, &BuildOptions::default()).expect_err("no features");
        assert!(matches!(err, Error::InvalidFeatures { .. }));
    }
}
