//! Error type for the tools.

use std::path::PathBuf;

use thiserror::Error;

use armada_core::error::GameError;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Everything a tool command can fail with.
#[derive(Error, Debug)]
pub enum ToolError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    /// Failed to read a file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse a scenario.
    #[error("Failed to parse scenario: {0}")]
    Scenario(#[from] ron::error::SpannedError),
    /// Scenario names something the catalog lacks.
    #[error("Scenario references unknown {kind} '{name}'")]
    UnknownReference {
        /// Table the name was looked up in.
        kind: &'static str,
        /// The missing name.
        name: String,
    },
    /// Engine rejected the catalog, config or a setup call.
    #[error(transparent)]
    Engine(#[from] GameError),
    /// Failed to encode a report.
    #[error("Failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Read a text file, mapping a missing file to [`ToolError::FileNotFound`].
pub(crate) fn read_text(path: &std::path::Path) -> ToolResult<String> {
    if !path.exists() {
        return Err(ToolError::FileNotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| ToolError::Read {
        path: path.to_path_buf(),
        source,
    })
}
