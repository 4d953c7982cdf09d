#![allow(dead_code)]

use mdfpack::catalog::{Catalog, CatalogDescriptor};
use mdfpack::publish::{DatasetSubmission, ModelSubmission, PublishResult, Repository, Tunnel};
use mdfpack::table::io_csv::from_csv_str;
use mdfpack::table::Table;
use mdfpack::PackError;
use serde_json::json;

/// Tunnel that records every open and close.
#[derive(Default)]
pub struct RecordingTunnel {
    pub opened: Vec<String>,
    pub closed: Vec<String>,
    pub payloads: Vec<Vec<u8>>,
}

impl Tunnel for RecordingTunnel {
    fn open(&mut self, payload: &[u8]) -> Result<String, PackError> {
        let url = format!("https://stub.tunnel/{}.json", self.opened.len() + 1);
        self.opened.push(url.clone());
        self.payloads.push(payload.to_vec());
        Ok(url)
    }

    fn close(&mut self, public_url: &str) -> Result<(), PackError> {
        self.closed.push(public_url.to_string());
        Ok(())
    }
}

/// Repository that records submissions and optionally fails every call.
#[derive(Default)]
pub struct StubRepository {
    pub fail: bool,
    pub datasets: Vec<DatasetSubmission>,
    pub models: Vec<ModelSubmission>,
    pub status_checks: Vec<String>,
}

impl StubRepository {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn respond(&self, endpoint: &str, source_id: &str) -> Result<PublishResult, PackError> {
        if self.fail {
            return Err(PackError::Remote {
                endpoint: endpoint.to_string(),
                message: "503 Service Unavailable".to_string(),
            });
        }
        let mut result = PublishResult::new();
        result.insert("source_id".to_string(), json!(source_id));
        result.insert("success".to_string(), json!(true));
        Ok(result)
    }
}

impl Repository for StubRepository {
    fn publish_dataset(
        &mut self,
        submission: &DatasetSubmission,
    ) -> Result<PublishResult, PackError> {
        self.datasets.push(submission.clone());
        self.respond("publish/dataset", "_test_dataset_v1.1")
    }

    fn publish_model(&mut self, submission: &ModelSubmission) -> Result<PublishResult, PackError> {
        self.models.push(submission.clone());
        self.respond("publish/model", "_test_model_v1.1")
    }

    fn check_status(&mut self, source_id: &str) -> Result<PublishResult, PackError> {
        self.status_checks.push(source_id.to_string());
        self.respond("status", source_id)
    }
}

/// Catalog holding a single dataset under `mdf/phases`.
pub struct FixtureCatalog;

impl Catalog for FixtureCatalog {
    fn resolve(&self, id: &str) -> Result<Table, PackError> {
        if id == "mdf/phases" {
            from_csv_str(include_str!("../fixtures/phases.csv"))
        } else {
            Err(PackError::CatalogApi {
                id: id.to_string(),
                message: "404 Not Found".to_string(),
            })
        }
    }

    fn describe(&self, id: &str) -> Result<CatalogDescriptor, PackError> {
        Ok(CatalogDescriptor {
            id: id.to_string(),
            license: Some("cc-by-4.0".to_string()),
            ..Default::default()
        })
    }
}
