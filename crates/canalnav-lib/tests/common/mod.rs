//! Shared fixture helpers for integration tests.

use std::path::PathBuf;

use canalnav_lib::{load_network, Network};

/// Directory holding the small Amsterdam snapshot used by tests.
#[allow(dead_code)]
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/amsterdam")
}

/// Load the fixture snapshot, panicking with context when it is absent.
#[allow(dead_code)]
pub fn fixture_network() -> Network {
    load_network(&fixture_dir()).expect("fixture snapshot loads")
}

/// GeoJSON feature collection the builder tests start from.
#[allow(dead_code)]
pub fn geojson_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/geojson/canals.geojson")
}
