//! Dataset and model resolution.
//!
//! A location string is resolved by trying an ordered list of sources until
//! one succeeds. The usual order is a local CSV file first and the catalog
//! second. Every failed attempt is kept so the final
//! [`PackError::DataResolution`] explains what was tried.

pub mod model;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::PackError;
use crate::table::io_csv::read_csv;
use crate::table::Table;

/// Where a dataset was loaded from.
///
/// Catalog-origin datasets already exist remotely, so publishing them is an
/// update; locally authored datasets are published as new entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Local { path: PathBuf },
    Catalog { id: String },
}

impl Provenance {
    pub fn is_catalog(&self) -> bool {
        matches!(self, Provenance::Catalog { .. })
    }

    /// Whether publishing this dataset updates an existing catalog entry.
    pub fn is_update(&self) -> bool {
        self.is_catalog()
    }
}

/// A loaded table with its optional target column and origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub table: Table,
    pub target: Option<String>,
    pub provenance: Provenance,
}

impl Dataset {
    /// Pair a table with its target. An empty target counts as none.
    ///
    /// # Errors
    /// Returns [`PackError::TargetNotFound`] if the target is not a column.
    pub fn new(
        table: Table,
        target: Option<&str>,
        provenance: Provenance,
    ) -> Result<Self, PackError> {
        let target = table.target_column(target)?.map(str::to_string);
        Ok(Self {
            table,
            target,
            provenance,
        })
    }
}

/// One way of turning a location string into a table.
pub trait DatasetSource {
    /// Short name used in resolution error messages.
    fn name(&self) -> &'static str;

    fn load(&self, location: &str) -> Result<(Table, Provenance), PackError>;
}

/// Reads the location as a local CSV path.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalCsv;

impl DatasetSource for LocalCsv {
    fn name(&self) -> &'static str {
        "local csv"
    }

    fn load(&self, location: &str) -> Result<(Table, Provenance), PackError> {
        let path = Path::new(location);
        let table = read_csv(path)?;
        Ok((
            table,
            Provenance::Local {
                path: path.to_path_buf(),
            },
        ))
    }
}

/// Resolves the location as a catalog identifier.
#[derive(Clone, Debug)]
pub struct CatalogSource<C> {
    catalog: C,
}

impl<C: Catalog> CatalogSource<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }
}

impl<C: Catalog> DatasetSource for CatalogSource<C> {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn load(&self, location: &str) -> Result<(Table, Provenance), PackError> {
        let table = self.catalog.resolve(location)?;

        match self.catalog.describe(location) {
            Ok(descriptor) => info!(
                id = location,
                license = descriptor.license.as_deref().unwrap_or("unknown"),
                description = descriptor.description.as_deref().unwrap_or(""),
                "catalog entry"
            ),
            Err(err) => debug!(id = location, error = %err, "catalog description unavailable"),
        }

        Ok((
            table,
            Provenance::Catalog {
                id: location.to_string(),
            },
        ))
    }
}

/// Resolve `location` with the first source that succeeds.
///
/// # Errors
/// Returns [`PackError::DataResolution`] when every source fails, and
/// [`PackError::TargetNotFound`] when the resolved table lacks the target.
pub fn load_dataset(
    location: &str,
    target: Option<&str>,
    sources: &[&dyn DatasetSource],
) -> Result<Dataset, PackError> {
    let mut attempts = Vec::with_capacity(sources.len());

    for source in sources {
        match source.load(location) {
            Ok((table, provenance)) => {
                info!(
                    location,
                    source = source.name(),
                    columns = table.columns().len(),
                    rows = table.len(),
                    "loaded data"
                );
                return Dataset::new(table, target, provenance);
            }
            Err(err) => {
                debug!(location, source = source.name(), error = %err, "data source failed");
                attempts.push(format!("{}: {}", source.name(), err));
            }
        }
    }

    Err(PackError::DataResolution {
        location: location.to_string(),
        attempts,
    })
}
