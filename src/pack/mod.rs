//! The loaded dataset, its metadata and an optional model.
//!
//! A [`Pack`] is built once per session. Construction resolves the dataset,
//! builds the metadata record and, when a model location is given, resolves
//! the model. Nothing changes afterwards; load a new pack to use different
//! data.

pub mod report;

use tracing::info;

use crate::error::PackError;
use crate::loader::model::{load_model, ModelArtifact, ModelSource};
use crate::loader::{load_dataset, Dataset, DatasetSource};
use crate::metadata::{build_metadata, Metadata};
use crate::table::Table;

pub use report::PackReport;

/// Dataset, metadata and optional model for one publish session.
#[derive(Clone, Debug)]
pub struct Pack {
    location: String,
    dataset: Dataset,
    metadata: Metadata,
    model: Option<ModelArtifact>,
}

/// Where to load a pack from.
#[derive(Clone, Copy, Debug)]
pub struct PackRequest<'r> {
    pub data: &'r str,
    pub target: Option<&'r str>,
    pub model: Option<&'r str>,
}

impl Pack {
    /// Load a pack with the given resolution strategies.
    ///
    /// Model sources are only consulted when `request.model` is set.
    pub fn load(
        request: PackRequest<'_>,
        data_sources: &[&dyn DatasetSource],
        model_sources: &[&dyn ModelSource],
    ) -> Result<Self, PackError> {
        let dataset = load_dataset(request.data, request.target, data_sources)?;
        let model = request
            .model
            .map(|location| load_model(location, model_sources))
            .transpose()?;

        Self::from_parts(request.data, dataset, model)
    }

    /// Assemble a pack from an already resolved dataset and model.
    pub fn from_parts(
        location: &str,
        dataset: Dataset,
        model: Option<ModelArtifact>,
    ) -> Result<Self, PackError> {
        let metadata = build_metadata(&dataset.table, dataset.target.as_deref())?;
        info!(
            location,
            inputs = metadata.inputs.len(),
            outputs = metadata.outputs.as_ref().map_or(0, Vec::len),
            model = model.is_some(),
            "built pack"
        );

        Ok(Self {
            location: location.to_string(),
            dataset,
            metadata,
            model,
        })
    }

    /// The location string the dataset was requested with.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn table(&self) -> &Table {
        &self.dataset.table
    }

    pub fn target(&self) -> Option<&str> {
        self.dataset.target.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn model(&self) -> Option<&ModelArtifact> {
        self.model.as_ref()
    }

    /// Summary suitable for display.
    pub fn report(&self) -> PackReport {
        PackReport::from_pack(self)
    }
}
