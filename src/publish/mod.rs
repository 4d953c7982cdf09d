//! Publishing datasets and models to the repository.
//!
//! A dataset publish serializes the table to column-oriented JSON, exposes it
//! at a temporary public URL through a [`Tunnel`], and hands that URL to the
//! [`Repository`] together with the metadata record. The exposure is closed
//! whether or not the repository call succeeds. A model publish needs no
//! exposure: it submits a servable descriptor built from the loaded model and
//! the dataset metadata.
//!
//! Remote failures are returned as they come from the repository client. No
//! call is ever retried.

pub mod http;
pub mod manifest;
pub mod status;
pub mod tunnel;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::PackError;
use crate::metadata::Metadata;
use crate::pack::Pack;

pub use status::StatusSink;

/// Status fields returned by the repository.
pub type PublishResult = Map<String, Value>;

/// Temporary public exposure of a payload.
pub trait Tunnel {
    /// Expose `payload` and return the public URL it can be fetched from.
    fn open(&mut self, payload: &[u8]) -> Result<String, PackError>;

    /// Tear down the exposure created for `public_url`.
    fn close(&mut self, public_url: &str) -> Result<(), PackError>;
}

/// The remote repository's publish API.
pub trait Repository {
    fn publish_dataset(&mut self, submission: &DatasetSubmission)
        -> Result<PublishResult, PackError>;

    fn publish_model(&mut self, submission: &ModelSubmission) -> Result<PublishResult, PackError>;

    fn check_status(&mut self, source_id: &str) -> Result<PublishResult, PackError>;
}

/// Body of a dataset publish call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetSubmission {
    pub metadata: Metadata,
    pub source_url: String,
    pub title: String,
    pub authors: Vec<String>,
    pub update: bool,
}

/// Body of a model publish call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSubmission {
    pub title: String,
    pub short_name: String,
    pub authors: Vec<String>,
    pub servable: ServableDescriptor,
}

/// How the repository should serve a model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServableDescriptor {
    #[serde(rename = "type")]
    pub servable_type: String,
    pub filepath: String,
    pub n_input_columns: usize,
    pub classes: Vec<Value>,
}

/// Caller-supplied details for a model publish.
#[derive(Clone, Debug, Default)]
pub struct ModelDetails {
    pub title: String,
    pub short_title: String,
    pub authors: Vec<String>,
    pub servable_type: String,
}

/// Holds an open tunnel and closes it when released or dropped.
pub struct TunnelGuard<'t> {
    tunnel: &'t mut dyn Tunnel,
    url: String,
    released: bool,
}

impl<'t> TunnelGuard<'t> {
    pub fn open(tunnel: &'t mut dyn Tunnel, payload: &[u8]) -> Result<Self, PackError> {
        let url = tunnel.open(payload)?;
        Ok(Self {
            tunnel,
            url,
            released: false,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Close the tunnel now, reporting any teardown error.
    pub fn release(mut self) -> Result<(), PackError> {
        self.released = true;
        self.tunnel.close(&self.url)
    }
}

impl Drop for TunnelGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.tunnel.close(&self.url) {
            warn!(url = %self.url, error = %err, "failed to close tunnel");
        }
    }
}

/// Runs publish operations against one tunnel, repository and status sink.
pub struct Publisher<'a> {
    tunnel: &'a mut dyn Tunnel,
    repository: &'a mut dyn Repository,
    sink: &'a mut dyn StatusSink,
}

impl<'a> Publisher<'a> {
    pub fn new(
        tunnel: &'a mut dyn Tunnel,
        repository: &'a mut dyn Repository,
        sink: &'a mut dyn StatusSink,
    ) -> Self {
        Self {
            tunnel,
            repository,
            sink,
        }
    }

    /// Publish the pack's dataset.
    ///
    /// Catalog-origin datasets are sent as updates, local ones as new
    /// datasets. On success the result fields, the public URL and the update
    /// flag are recorded in the status sink. A sink failure after the
    /// repository accepted the dataset is logged and the result is still
    /// returned, so the `source_id` is never lost.
    ///
    /// # Errors
    /// Tunnel and repository errors are returned unchanged. The tunnel is
    /// closed on every path once it has been opened.
    pub fn publish_dataset(
        &mut self,
        pack: &Pack,
        title: &str,
        authors: &[String],
    ) -> Result<PublishResult, PackError> {
        let payload = serde_json::to_vec_pretty(&pack.table().to_column_json())?;
        let update = pack.dataset().provenance.is_update();

        let guard = TunnelGuard::open(&mut *self.tunnel, &payload)?;
        let url = guard.url().to_string();
        info!(%url, update, bytes = payload.len(), "exposed dataset");

        let submission = DatasetSubmission {
            metadata: pack.metadata().clone(),
            source_url: url.clone(),
            title: title.to_string(),
            authors: authors.to_vec(),
            update,
        };
        let result = self.repository.publish_dataset(&submission);

        if let Err(err) = guard.release() {
            warn!(%url, error = %err, "failed to close tunnel after publish");
        }

        let result = result?;
        info!(?result, "data submission");

        let mut entries = status::result_entries(&result);
        entries.push(("url".to_string(), url));
        entries.push(("update".to_string(), update.to_string()));
        if let Err(err) = self.sink.record(&entries) {
            warn!(?result, error = %err, "dataset published but status was not recorded");
        }

        Ok(result)
    }

    /// Publish the pack's model as a servable.
    ///
    /// # Errors
    /// Returns [`PackError::PublishPrecondition`] if no model was loaded, the
    /// dataset has no target column, or the servable type is empty.
    pub fn publish_model(
        &mut self,
        pack: &Pack,
        details: &ModelDetails,
    ) -> Result<PublishResult, PackError> {
        publish_model(&mut *self.repository, pack, details)
    }
}

/// Publish a pack's model as a servable. Needs no tunnel and writes no status.
///
/// # Errors
/// Same preconditions as [`build_model_submission`]; repository errors are
/// returned unchanged.
pub fn publish_model(
    repository: &mut dyn Repository,
    pack: &Pack,
    details: &ModelDetails,
) -> Result<PublishResult, PackError> {
    let submission = build_model_submission(pack, details)?;
    let result = repository.publish_model(&submission)?;
    info!(?result, "model submission");
    Ok(result)
}

/// Build the model publish body from a pack.
pub fn build_model_submission(
    pack: &Pack,
    details: &ModelDetails,
) -> Result<ModelSubmission, PackError> {
    let model = pack.model().ok_or_else(|| {
        PackError::PublishPrecondition("no model was loaded for this dataset".to_string())
    })?;

    if details.servable_type.trim().is_empty() {
        return Err(PackError::PublishPrecondition(
            "a servable type is required".to_string(),
        ));
    }

    let target = pack.target().ok_or_else(|| {
        PackError::PublishPrecondition(
            "model publishing needs a target column to list classes".to_string(),
        )
    })?;
    let classes = pack.table().unique_values(target).unwrap_or_default();

    Ok(ModelSubmission {
        title: details.title.clone(),
        short_name: details.short_title.clone(),
        authors: details.authors.clone(),
        servable: ServableDescriptor {
            servable_type: details.servable_type.clone(),
            filepath: model.servable_path(),
            n_input_columns: pack.metadata().input_count(),
            classes,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingTunnel {
        opened: usize,
        closed: Vec<String>,
        fail_close: bool,
    }

    impl Tunnel for CountingTunnel {
        fn open(&mut self, _payload: &[u8]) -> Result<String, PackError> {
            self.opened += 1;
            Ok(format!("https://tunnel.test/{}", self.opened))
        }

        fn close(&mut self, public_url: &str) -> Result<(), PackError> {
            self.closed.push(public_url.to_string());
            if self.fail_close {
                return Err(PackError::Tunnel {
                    message: "agent gone".to_string(),
                });
            }
            Ok(())
        }
    }

    fn tunnel(fail_close: bool) -> CountingTunnel {
        CountingTunnel {
            opened: 0,
            closed: Vec::new(),
            fail_close,
        }
    }

    #[test]
    fn guard_closes_on_drop() {
        let mut tunnel = tunnel(false);
        {
            let guard = TunnelGuard::open(&mut tunnel, b"{}").unwrap();
            assert_eq!(guard.url(), "https://tunnel.test/1");
        }
        assert_eq!(tunnel.closed, ["https://tunnel.test/1"]);
    }

    #[test]
    fn guard_closes_once_when_released() {
        let mut tunnel = tunnel(false);
        let guard = TunnelGuard::open(&mut tunnel, b"{}").unwrap();
        guard.release().unwrap();
        assert_eq!(tunnel.closed.len(), 1);
    }

    #[test]
    fn release_reports_close_errors() {
        let mut tunnel = tunnel(true);
        let guard = TunnelGuard::open(&mut tunnel, b"{}").unwrap();
        assert!(matches!(guard.release(), Err(PackError::Tunnel { .. })));
        assert_eq!(tunnel.closed.len(), 1);
    }

    #[test]
    fn servable_type_serializes_as_type() {
        let descriptor = ServableDescriptor {
            servable_type: "sklearn".to_string(),
            filepath: "model.pkl".to_string(),
            n_input_columns: 2,
            classes: vec![serde_json::json!("a")],
        };
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["type"], "sklearn");
        assert_eq!(value["n_input_columns"], 2);
    }
}
