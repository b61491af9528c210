use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the analyzers.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// An input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The trace document is not valid JSON. The trace is parsed as one unit,
    /// so this is always fatal.
    #[error("Failed to parse trace {path}: {source}")]
    TraceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An output file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON value could not be (de)serialized.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the tracelens crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;
