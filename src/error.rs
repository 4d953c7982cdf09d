use std::path::PathBuf;
use thiserror::Error;

/// The main error type for mdfpack operations.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid CSV table in {path}: {message}")]
    CsvInvalid { path: PathBuf, message: String },

    #[error("Target column '{target}' not found (columns: {})", columns.join(", "))]
    TargetNotFound {
        target: String,
        columns: Vec<String>,
    },

    #[error("No supported data format nor catalog id for '{location}': {}", attempts.join("; "))]
    DataResolution {
        location: String,
        attempts: Vec<String>,
    },

    #[error("No supported model format nor catalog servable for '{location}': {}", attempts.join("; "))]
    ModelResolution {
        location: String,
        attempts: Vec<String>,
    },

    #[error("Cannot publish: {0}")]
    PublishPrecondition(String),

    #[error("Failed to resolve catalog reference '{input}': {message}")]
    CatalogResolve { input: String, message: String },

    #[error("Catalog API error for '{id}': {message}")]
    CatalogApi { id: String, message: String },

    #[error("Tunnel error: {message}")]
    Tunnel { message: String },

    #[error("Remote call to {endpoint} failed: {message}")]
    Remote { endpoint: String, message: String },

    #[error("Status log {path}: {message}")]
    StatusLog { path: PathBuf, message: String },

    #[error("Failed to parse publish manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
