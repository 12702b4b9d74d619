use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the canalnav library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a coordinate order string is neither `lonlat` nor `latlon`.
    #[error("invalid coordinate order '{value}'; expected 'lonlat' or 'latlon'")]
    InvalidCoordinateOrder { value: String },

    /// Raised when a user supplied location could not be resolved.
    #[error("unknown location: {name}{}", format_suggestions(.suggestions))]
    UnknownNode {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a node references a neighbor that is absent from the graph.
    #[error("node {from} references missing neighbor {name}")]
    MissingNode { from: String, name: String },

    /// Raised when no stored link connects two consecutive route nodes.
    #[error("no link connects {from} to {to}")]
    MissingLink { from: String, to: String },

    /// Raised when no route could be found between two locations.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when a bounded search did not finish within its budget.
    #[error("route search between {start} and {goal} exceeded {budget_ms}ms budget")]
    SearchTimedOut {
        start: String,
        goal: String,
        budget_ms: u128,
    },

    /// Raised when the worker running a bounded search stopped without a result.
    #[error("route search worker stopped without producing a result")]
    SearchAborted,

    /// Raised when a computed route lacks any nodes.
    #[error("route plan was empty")]
    EmptyRoutePlan,

    /// Graph snapshot could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Raised when a snapshot declares a schema version this build cannot read.
    #[error("unsupported schema version {version} in {path}")]
    UnsupportedSchema { path: PathBuf, version: f64 },

    /// Raised when a chunked snapshot file splits a different collection than
    /// the one expected for that file.
    #[error("chunked snapshot {path} splits '{found}', expected '{expected}'")]
    ChunkTargetMismatch {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },

    /// Raised when a source feature collection cannot be turned into a graph.
    #[error("invalid feature collection {path}: {reason}")]
    InvalidFeatures { path: PathBuf, reason: String },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the dataset")]
    ProjectDirsUnavailable,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_node_without_suggestions_has_plain_message() {
        let err = Error::UnknownNode {
            name: "Nowhere".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(err.to_string(), "unknown location: Nowhere");
    }

    #[test]
    fn unknown_node_lists_multiple_suggestions() {
        let err = Error::UnknownNode {
            name: "Heren".to_string(),
            suggestions: vec!["Herengracht".to_string(), "Keizersgracht".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown location: Heren. Did you mean one of: 'Herengracht', 'Keizersgracht'?"
        );
    }
}
