//! Optional YAML publish manifest.
//!
//! ```yaml
//! title: Steel yield strength
//! short_title: steel-yield
//! authors:
//!   - Ada Lovelace
//!   - Alan Turing
//! servable_type: sklearn
//! ```
//!
//! Every field is optional; command-line flags override manifest values.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::ModelDetails;
use crate::error::PackError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishManifest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub servable_type: Option<String>,
}

impl PublishManifest {
    pub fn from_yaml_str(data: &str, path: &Path) -> Result<Self, PackError> {
        serde_yaml::from_str(data).map_err(|source| PackError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, PackError> {
        let data = fs::read_to_string(path).map_err(PackError::Io)?;
        Self::from_yaml_str(&data, path)
    }

    /// Merge command-line values over the manifest.
    ///
    /// Non-empty `authors` from the command line replace the manifest list.
    pub fn merge(
        &self,
        title: Option<&str>,
        short_title: Option<&str>,
        authors: &[String],
        servable_type: Option<&str>,
    ) -> ModelDetails {
        let pick = |flag: Option<&str>, field: &Option<String>| {
            flag.map(str::to_string)
                .or_else(|| field.clone())
                .unwrap_or_default()
        };

        ModelDetails {
            title: pick(title, &self.title),
            short_title: pick(short_title, &self.short_title),
            authors: if authors.is_empty() {
                self.authors.clone()
            } else {
                authors.to_vec()
            },
            servable_type: pick(servable_type, &self.servable_type),
        }
    }
}
