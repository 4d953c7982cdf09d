//! Model artifact resolution.
//!
//! Models are opaque: a local artifact is carried as raw bytes, and a catalog
//! servable is carried by identifier only and resolved by the repository at
//! publish time.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::validate_id;
use crate::error::PackError;

/// A resolved model.
#[derive(Clone, PartialEq, Eq)]
pub enum ModelArtifact {
    Local { path: PathBuf, bytes: Vec<u8> },
    Catalog { id: String },
}

impl ModelArtifact {
    /// The path or identifier the repository should serve the model from.
    pub fn servable_path(&self) -> String {
        match self {
            ModelArtifact::Local { path, .. } => path.display().to_string(),
            ModelArtifact::Catalog { id } => id.clone(),
        }
    }
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelArtifact::Local { path, bytes } => f
                .debug_struct("Local")
                .field("path", path)
                .field("len", &bytes.len())
                .finish(),
            ModelArtifact::Catalog { id } => f.debug_struct("Catalog").field("id", id).finish(),
        }
    }
}

/// One way of turning a location string into a model artifact.
pub trait ModelSource {
    fn name(&self) -> &'static str;

    fn load(&self, location: &str) -> Result<ModelArtifact, PackError>;
}

/// Reads the location as a serialized model file.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalArtifact;

impl ModelSource for LocalArtifact {
    fn name(&self) -> &'static str {
        "local artifact"
    }

    fn load(&self, location: &str) -> Result<ModelArtifact, PackError> {
        let path = Path::new(location);
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(PackError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("model file {} is empty", path.display()),
            )));
        }

        Ok(ModelArtifact::Local {
            path: path.to_path_buf(),
            bytes,
        })
    }
}

/// Accepts the location as a catalog servable identifier.
///
/// Nothing is fetched; the identifier only has to be well formed.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogServable;

impl ModelSource for CatalogServable {
    fn name(&self) -> &'static str {
        "catalog servable"
    }

    fn load(&self, location: &str) -> Result<ModelArtifact, PackError> {
        let id = validate_id(location)?;
        Ok(ModelArtifact::Catalog { id })
    }
}

/// Resolve `location` with the first model source that succeeds.
///
/// # Errors
/// Returns [`PackError::ModelResolution`] when every source fails.
pub fn load_model(
    location: &str,
    sources: &[&dyn ModelSource],
) -> Result<ModelArtifact, PackError> {
    let mut attempts = Vec::with_capacity(sources.len());

    for source in sources {
        match source.load(location) {
            Ok(artifact) => {
                info!(location, source = source.name(), "loaded model");
                return Ok(artifact);
            }
            Err(err) => {
                debug!(location, source = source.name(), error = %err, "model source failed");
                attempts.push(format!("{}: {}", source.name(), err));
            }
        }
    }

    Err(PackError::ModelResolution {
        location: location.to_string(),
        attempts,
    })
}
