//! Snapshot files on disk: locating, reading and writing them.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::network::{Junction, Link, Network};

/// Graph snapshot with junctions and their neighbor references.
pub const GRAPH_FILENAME: &str = "graph_nodes.json";
/// Optional link metadata keyed by link identifier.
pub const LINKS_FILENAME: &str = "graph_links.json";
/// Optional display names mapped to junction identifiers.
pub const LOCATORS_FILENAME: &str = "graph_locators.json";

/// Environment variable overriding the dataset directory.
pub const DATA_DIR_ENV: &str = "CANALNAV_DATA_DIR";

/// Major schema version this build understands.
const SUPPORTED_SCHEMA_MAJOR: f64 = 1.0;

/// Paths to the files of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub graph: PathBuf,
    pub links: Option<PathBuf>,
    pub locators: Option<PathBuf>,
}

impl DatasetPaths {
    /// Locate snapshot files inside `dir`. Optional files are only recorded
    /// when present.
    pub fn in_dir(dir: &Path) -> Self {
        let existing = |name: &str| {
            let path = dir.join(name);
            path.is_file().then_some(path)
        };
        Self {
            graph: dir.join(GRAPH_FILENAME),
            links: existing(LINKS_FILENAME),
            locators: existing(LOCATORS_FILENAME),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    schema_version: f64,
    #[serde(flatten)]
    body: EnvelopeBody<T>,
}

/// Body of a snapshot file: either inline, or split into sibling chunk files
/// listed by name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnvelopeBody<T> {
    #[serde(rename_all = "camelCase")]
    Chunked {
        chunk_target: String,
        chunks: Vec<String>,
    },
    Inline(T),
}

/// Envelope written by [`write_snapshot`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOut<'a, T> {
    name: &'a str,
    created_at: &'a str,
    schema_version: f64,
    #[serde(flatten)]
    body: T,
}

/// Payload of one snapshot file. Chunked files store the payload's single
/// collection split across bare JSON documents.
trait SnapshotBody: DeserializeOwned {
    /// Key of the collection inside the envelope.
    const TARGET: &'static str;
    type Chunk: DeserializeOwned;

    fn from_chunks(chunks: Vec<Self::Chunk>) -> Self;
}

#[derive(Debug, Deserialize, Serialize)]
struct GraphBody<G = BTreeMap<String, Junction>> {
    graph: G,
}

impl SnapshotBody for GraphBody {
    const TARGET: &'static str = "graph";
    type Chunk = BTreeMap<String, Junction>;

    fn from_chunks(chunks: Vec<Self::Chunk>) -> Self {
        Self {
            graph: chunks.into_iter().flatten().collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct LinksBody<L = BTreeMap<String, Link>> {
    tree: L,
}

impl SnapshotBody for LinksBody {
    const TARGET: &'static str = "tree";
    type Chunk = BTreeMap<String, Link>;

    fn from_chunks(chunks: Vec<Self::Chunk>) -> Self {
        Self {
            tree: chunks.into_iter().flatten().collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct LocatorsBody<L = Vec<Locator>> {
    locators: L,
}

impl SnapshotBody for LocatorsBody {
    const TARGET: &'static str = "locators";
    type Chunk = Vec<Locator>;

    fn from_chunks(chunks: Vec<Self::Chunk>) -> Self {
        Self {
            locators: chunks.into_iter().flatten().collect(),
        }
    }
}

/// Display name for a junction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub name: String,
    pub value: String,
}

/// Resolve the dataset directory.
///
/// The resolution order is:
/// 1. Explicit `target` argument when provided.
/// 2. `CANALNAV_DATA_DIR` environment variable.
/// 3. Platform-specific project data directory.
pub fn resolve_data_dir(target: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = target {
        return Ok(explicit.to_path_buf());
    }

    if let Some(env_path) = env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(env_path));
    }

    default_data_dir()
}

/// Platform data directory used when nothing else is configured.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "canalnav", "canalnav").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Load the snapshot stored in `dir`.
pub fn load_network(dir: &Path) -> Result<Network> {
    let paths = DatasetPaths::in_dir(dir);
    load_network_from(&paths)
}

/// Load a snapshot from explicit file paths.
pub fn load_network_from(paths: &DatasetPaths) -> Result<Network> {
    if !paths.graph.is_file() {
        return Err(Error::DatasetNotFound {
            path: paths.graph.clone(),
        });
    }

    let nodes = read_envelope::<GraphBody>(&paths.graph)?.graph;

    let links = match &paths.links {
        Some(path) => read_envelope::<LinksBody>(path)?.tree,
        None => BTreeMap::new(),
    };

    let mut network = Network::from_parts(nodes, links, BTreeMap::new());
    if let Some(path) = &paths.locators {
        for locator in read_envelope::<LocatorsBody>(path)?.locators {
            network.add_locator(locator.name, locator.value);
        }
    }

    let dangling = network.dangling_references();
    if !dangling.is_empty() {
        warn!(
            count = dangling.len(),
            first_from = dangling[0].0,
            first_missing = dangling[0].1,
            "snapshot contains neighbor references to missing junctions"
        );
    }

    debug!(
        path = %paths.graph.display(),
        nodes = network.node_count(),
        links = network.link_count(),
        locators = network.locator_count(),
        "loaded network snapshot"
    );

    Ok(network)
}

/// Parse a graph snapshot document that has already been read into memory.
///
/// `origin` names the file the document came from; chunk files of a chunked
/// document are resolved next to it.
pub fn parse_graph(json: &str, origin: &Path) -> Result<Network> {
    let body = decode_envelope::<GraphBody>(json, origin)?;
    Ok(Network::from_parts(body.graph, BTreeMap::new(), BTreeMap::new()))
}

fn read_envelope<T: SnapshotBody>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    decode_envelope(&contents, path)
}

fn decode_envelope<T: SnapshotBody>(json: &str, path: &Path) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(json)?;
    check_schema(envelope.schema_version, path)?;
    debug!(
        path = %path.display(),
        name = envelope.name.as_deref().unwrap_or("<unnamed>"),
        created_at = envelope.created_at.as_deref().unwrap_or("<unknown>"),
        "read snapshot file"
    );

    match envelope.body {
        EnvelopeBody::Inline(body) => Ok(body),
        EnvelopeBody::Chunked {
            chunk_target,
            chunks,
        } => {
            if chunk_target != T::TARGET {
                return Err(Error::ChunkTargetMismatch {
                    path: path.to_path_buf(),
                    expected: T::TARGET,
                    found: chunk_target,
                });
            }
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            let parts = chunks
                .iter()
                .map(|name| read_chunk::<T::Chunk>(&dir.join(name)))
                .collect::<Result<Vec<_>>>()?;
            debug!(path = %path.display(), chunks = parts.len(), "merged chunked snapshot");
            Ok(T::from_chunks(parts))
        }
    }
}

fn read_chunk<C: DeserializeOwned>(path: &Path) -> Result<C> {
    if !path.is_file() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn check_schema(version: f64, path: &Path) -> Result<()> {
    if version.trunc() == SUPPORTED_SCHEMA_MAJOR {
        Ok(())
    } else {
        Err(Error::UnsupportedSchema {
            path: path.to_path_buf(),
            version,
        })
    }
}

/// Write the three snapshot files into `dir`, creating it when needed.
pub fn write_snapshot(
    dir: &Path,
    graph: &BTreeMap<String, Junction>,
    links: &BTreeMap<String, Link>,
    locators: &[Locator],
) -> Result<DatasetPaths> {
    fs::create_dir_all(dir)?;
    let created_at = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();

    let paths = DatasetPaths {
        graph: dir.join(GRAPH_FILENAME),
        links: Some(dir.join(LINKS_FILENAME)),
        locators: Some(dir.join(LOCATORS_FILENAME)),
    };
    write_envelope(&paths.graph, &created_at, GraphBody { graph })?;
    write_envelope(dir.join(LINKS_FILENAME).as_path(), &created_at, LinksBody { tree: links })?;
    write_envelope(
        dir.join(LOCATORS_FILENAME).as_path(),
        &created_at,
        LocatorsBody { locators },
    )?;

    debug!(
        dir = %dir.display(),
        nodes = graph.len(),
        links = links.len(),
        locators = locators.len(),
        "wrote network snapshot"
    );
    Ok(paths)
}

fn write_envelope<T: Serialize>(path: &Path, created_at: &str, body: T) -> Result<()> {
    let name = path.display().to_string();
    let envelope = EnvelopeOut {
        name: &name,
        created_at,
        schema_version: SUPPORTED_SCHEMA_MAJOR,
        body,
    };
    let mut writer = io::BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &envelope)?;
    writer.flush()?;
    Ok(())
}
