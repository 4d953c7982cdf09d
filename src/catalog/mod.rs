//! Remote data catalog access.
//!
//! The catalog is where previously published datasets live. The loader uses it
//! as a fallback source when a location is not a readable local file, and the
//! origin recorded by that fallback later decides whether a publish creates a
//! new dataset or updates an existing one.
//!
//! Concrete backends implement [`Catalog`]; the Hugging Face Hub backend lives
//! in [`hub`] behind the `hub` feature.

#[cfg(feature = "hub")]
pub mod hub;

use serde::Serialize;
use serde_json::Value;

use crate::error::PackError;
use crate::table::Table;

/// A remote catalog that can materialize datasets by identifier.
pub trait Catalog {
    /// Fetch the dataset named by `id` and materialize it as a table.
    fn resolve(&self, id: &str) -> Result<Table, PackError>;

    /// Fetch descriptive information about `id`.
    ///
    /// Only used for reporting; failures here never block loading.
    fn describe(&self, id: &str) -> Result<CatalogDescriptor, PackError>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn resolve(&self, id: &str) -> Result<Table, PackError> {
        (**self).resolve(id)
    }

    fn describe(&self, id: &str) -> Result<CatalogDescriptor, PackError> {
        (**self).describe(id)
    }
}

/// Informational description of a catalog entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CatalogDescriptor {
    pub id: String,
    pub description: Option<String>,
    pub license: Option<String>,
    pub features: Option<Value>,
}

/// Canonical reference to a catalog dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogRef {
    pub id: String,
    pub revision: Option<String>,
}

/// Host accepted for catalog URLs.
pub const CATALOG_HOST: &str = "huggingface.co";

impl CatalogRef {
    /// Parse `<namespace>/<name>` or a catalog dataset URL.
    ///
    /// A `revision` pins the lookup; a URL under `/tree/<rev>` must agree
    /// with it.
    pub fn parse(input: &str, revision: Option<&str>) -> Result<Self, PackError> {
        let fail = |message: String| PackError::CatalogResolve {
            input: input.to_string(),
            message,
        };

        let (id, url_revision) = match url::Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                dataset_path(&url).map_err(fail)?
            }
            _ => (validate_id(input)?, None),
        };

        let revision = match (revision, url_revision) {
            (Some(pinned), Some(found)) if pinned != found => {
                return Err(fail(format!(
                    "conflicting revisions: '{pinned}' requested, URL points at '{found}'"
                )));
            }
            (pinned, found) => pinned.map(str::to_string).or(found),
        };

        Ok(Self { id, revision })
    }
}

/// `https://huggingface.co/datasets/<namespace>/<name>[/tree/<rev>]`
fn dataset_path(url: &url::Url) -> Result<(String, Option<String>), String> {
    if url.host_str() != Some(CATALOG_HOST) {
        return Err(format!("not a {CATALOG_HOST} URL"));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        ["datasets", namespace, name, rest @ ..] => {
            let id = validate_id(&format!("{namespace}/{name}")).map_err(|err| err.to_string())?;
            let revision = match rest {
                ["tree", revision, ..] => Some(revision.to_string()),
                _ => None,
            };
            Ok((id, revision))
        }
        _ => Err(format!(
            "expected https://{CATALOG_HOST}/datasets/<namespace>/<name>"
        )),
    }
}

/// Check that `id` has the `<namespace>/<name>` form and return it trimmed.
pub fn validate_id(id: &str) -> Result<String, PackError> {
    let trimmed = id.trim();
    match trimmed.split_once('/') {
        Some((namespace, name))
            if !namespace.is_empty()
                && !name.is_empty()
                && !name.contains('/')
                && !trimmed.contains(char::is_whitespace) =>
        {
            Ok(trimmed.to_string())
        }
        _ => Err(PackError::CatalogResolve {
            input: id.to_string(),
            message: "expected id in '<namespace>/<name>' form".to_string(),
        }),
    }
}
