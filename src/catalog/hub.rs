//! Hugging Face Hub dataset repositories as a catalog.
//!
//! A catalog entry is a dataset repo holding at least one CSV file. The
//! shallowest CSV (ties broken by path) is downloaded through the hub cache and
//! read as the dataset table. Descriptions come from the datasets-server
//! `info` endpoint on a best-effort basis.

use std::path::Path;
use std::time::Duration;

use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use serde_json::Value;
use tracing::{debug, info};

use super::{Catalog, CatalogDescriptor, CatalogRef};
use crate::error::PackError;
use crate::table::io_csv::read_csv;
use crate::table::Table;

const VIEWER_BASE_URL: &str = "https://datasets-server.huggingface.co";

/// Catalog backed by Hugging Face Hub dataset repositories.
#[derive(Clone, Debug, Default)]
pub struct HubCatalog {
    token: Option<String>,
    revision: Option<String>,
    timeout: Option<Duration>,
}

impl HubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an access token. Falls back to `HF_TOKEN` when unset.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Pin a revision (branch, tag or commit) for every lookup.
    pub fn with_revision(mut self, revision: Option<String>) -> Self {
        self.revision = revision;
        self
    }

    /// Timeout for the datasets-server description call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn effective_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("HF_TOKEN").ok())
    }

    fn repo(&self, catalog_ref: &CatalogRef) -> Result<ApiRepo, PackError> {
        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(token) = self.effective_token() {
            builder = builder.with_token(Some(token));
        }

        let api = builder.build().map_err(|source| PackError::CatalogApi {
            id: catalog_ref.id.clone(),
            message: source.to_string(),
        })?;

        Ok(match catalog_ref.revision.as_ref() {
            Some(revision) => api.repo(Repo::with_revision(
                catalog_ref.id.clone(),
                RepoType::Dataset,
                revision.clone(),
            )),
            None => api.dataset(catalog_ref.id.clone()),
        })
    }
}

impl Catalog for HubCatalog {
    fn resolve(&self, id: &str) -> Result<Table, PackError> {
        let catalog_ref = CatalogRef::parse(id, self.revision.as_deref())?;
        let repo = self.repo(&catalog_ref)?;

        let repo_info = repo.info().map_err(|source| PackError::CatalogApi {
            id: catalog_ref.id.clone(),
            message: source.to_string(),
        })?;

        let files: Vec<String> = repo_info
            .siblings
            .iter()
            .map(|sibling| sibling.rfilename.clone())
            .collect();

        let selected = select_table_path(&files).ok_or_else(|| PackError::CatalogApi {
            id: catalog_ref.id.clone(),
            message: "repository has no CSV file".to_string(),
        })?;
        debug!(id = %catalog_ref.id, file = %selected, "selected catalog table");

        let local = repo
            .download(&selected)
            .map_err(|source| PackError::CatalogApi {
                id: catalog_ref.id.clone(),
                message: format!("failed downloading '{}': {}", selected, source),
            })?;

        info!(id = %catalog_ref.id, path = %local.display(), "downloaded catalog table");
        read_csv(&local)
    }

    fn describe(&self, id: &str) -> Result<CatalogDescriptor, PackError> {
        let catalog_ref = CatalogRef::parse(id, self.revision.as_deref())?;
        let info_json = fetch_viewer_info(
            &catalog_ref,
            self.effective_token().as_deref(),
            self.timeout.unwrap_or(Duration::from_secs(10)),
        )?;

        Ok(CatalogDescriptor {
            id: catalog_ref.id,
            description: extract_string(&info_json, "description"),
            license: extract_string(&info_json, "license"),
            features: extract_features(&info_json),
        })
    }
}

/// Pick the CSV file to load: shallowest first, then by path.
fn select_table_path(paths: &[String]) -> Option<String> {
    paths
        .iter()
        .filter(|path| is_csv_file(path))
        .min_by(|a, b| {
            let depth_a = a.split('/').count();
            let depth_b = b.split('/').count();
            depth_a.cmp(&depth_b).then_with(|| a.cmp(b))
        })
        .cloned()
}

fn is_csv_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn fetch_viewer_info(
    catalog_ref: &CatalogRef,
    token: Option<&str>,
    timeout: Duration,
) -> Result<Value, PackError> {
    let api_error = |message: String| PackError::CatalogApi {
        id: catalog_ref.id.clone(),
        message,
    };

    let mut url = url::Url::parse(&format!("{}/info", VIEWER_BASE_URL))
        .map_err(|source| api_error(source.to_string()))?;
    url.query_pairs_mut()
        .append_pair("dataset", &catalog_ref.id);

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent: ureq::Agent = config.into();

    let mut request = agent.get(url.as_str());
    if let Some(token) = token {
        request = request.header("Authorization", &format!("Bearer {token}"));
    }

    let mut response = request
        .call()
        .map_err(|source| api_error(source.to_string()))?;
    response
        .body_mut()
        .read_json::<Value>()
        .map_err(|source| api_error(source.to_string()))
}

fn extract_features(info_json: &Value) -> Option<Value> {
    info_json
        .get("dataset_info")
        .and_then(|value| value.get("features"))
        .cloned()
        .or_else(|| info_json.get("features").cloned())
}

fn extract_string(info_json: &Value, key: &str) -> Option<String> {
    info_json
        .get("dataset_info")
        .and_then(|value| value.get(key))
        .or_else(|| info_json.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_selection_prefers_shallow_csv() {
        let files = vec![
            "README.md".to_string(),
            "data/train.csv".to_string(),
            "yield.csv".to_string(),
            "alloys.CSV".to_string(),
        ];
        assert_eq!(select_table_path(&files).as_deref(), Some("alloys.CSV"));
    }

    #[test]
    fn table_selection_without_csv_is_none() {
        let files = vec!["README.md".to_string(), "data.parquet".to_string()];
        assert_eq!(select_table_path(&files), None);
    }

    #[test]
    fn description_fields_are_read_from_dataset_info() {
        let info = serde_json::json!({
            "dataset_info": {
                "description": "Yield strengths of steels",
                "features": {"Yield": {"dtype": "float64"}}
            },
            "license": "cc-by-4.0"
        });

        assert_eq!(
            extract_string(&info, "description").as_deref(),
            Some("Yield strengths of steels")
        );
        assert_eq!(extract_string(&info, "license").as_deref(), Some("cc-by-4.0"));
        assert!(extract_features(&info).is_some());
    }
}
