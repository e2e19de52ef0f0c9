//! @ai:module:intent Define error types for service descriptor generation
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all scan, aggregation and output operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Parse error at {file}:{line}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error(
        "mixed relationship definition patterns detected: some relationships use explicit \
         patterns (service:name:action) while others use implicit patterns (service:action)"
    )]
    MixedAddressing,

    #[error("no service found for relationship: {relationship}")]
    NoServiceFound { relationship: String },

    #[error(
        "cannot attach relationship ({relationship}) implicitly: {} services are declared ({}); \
         use explicit addressing (service:<name>:<action>)",
        .candidates.len(),
        .candidates.join(", ")
    )]
    AmbiguousService {
        relationship: String,
        candidates: Vec<String>,
    },

    #[error("service `{0}` is declared more than once")]
    DuplicateService(String),

    #[error("no services found")]
    NoServicesFound,

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("more than one service would be written to {0}")]
    OutputCollision(PathBuf),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
