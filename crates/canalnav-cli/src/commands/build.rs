//! Build command handler: turn a GeoJSON feature collection into a snapshot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use canalnav_lib::{build_from_path, resolve_data_dir, BuildOptions, Snapshot};

use crate::output::OutputFormat;

/// Arguments for the build subcommand.
#[derive(Debug, Clone)]
pub struct BuildCommandArgs {
    pub input: PathBuf,
    pub dist_tolerance: f64,
}

/// What a build wrote and where.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub dir: PathBuf,
    pub nodes: usize,
    pub links: usize,
    pub locators: usize,
}

impl BuildReport {
    fn new(dir: &Path, snapshot: &Snapshot) -> Self {
        Self {
            dir: dir.to_path_buf(),
            nodes: snapshot.graph.len(),
            links: snapshot.links.len(),
            locators: snapshot.locators.len(),
        }
    }

    fn render_text(&self) -> String {
        format!(
            "Snapshot written to {} ({} nodes, {} links, {} locators)\n",
            self.dir.display(),
            self.nodes,
            self.links,
            self.locators
        )
    }
}

/// Handle the build subcommand: write the snapshot into the resolved data
/// directory.
pub fn handle_build_command(
    data_dir: Option<&Path>,
    args: &BuildCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let dir = resolve_data_dir(data_dir).context("failed to resolve the dataset directory")?;
    let options = BuildOptions {
        dist_tolerance: args.dist_tolerance,
    };
    let snapshot = build_from_path(&args.input, &options)
        .with_context(|| format!("failed to build a snapshot from {}", args.input.display()))?;
    snapshot
        .write_to(&dir)
        .with_context(|| format!("failed to write snapshot to {}", dir.display()))?;

    let report = BuildReport::new(&dir, &snapshot);
    format.render_value(&report, || report.render_text())
}
