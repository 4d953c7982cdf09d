//! Persisted publish status.
//!
//! After a successful dataset publish the result is written as flat
//! `key: value` lines. The `status` command reads the file back and asks the
//! repository about the entry's `source_id`. Appending means a later publish
//! overrides earlier keys when read back; a missing or stale file is how an
//! earlier failure shows up.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{PublishResult, Repository};
use crate::error::PackError;

/// Key the repository uses to identify a submission.
pub const SOURCE_ID_KEY: &str = "source_id";

/// Default status log file name.
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// Destination for publish status entries.
pub trait StatusSink {
    fn record(&mut self, entries: &[(String, String)]) -> Result<(), PackError>;
}

/// In-memory sink.
impl StatusSink for Vec<(String, String)> {
    fn record(&mut self, entries: &[(String, String)]) -> Result<(), PackError> {
        self.extend_from_slice(entries);
        Ok(())
    }
}

/// Appends `key: value` lines to a file.
#[derive(Clone, Debug)]
pub struct StatusLog {
    path: PathBuf,
}

impl StatusLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatusSink for StatusLog {
    fn record(&mut self, entries: &[(String, String)]) -> Result<(), PackError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for (key, value) in entries {
            writeln!(writer, "{}: {}", single_line(key), single_line(value))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Flatten a repository result into log entries.
///
/// String values are written bare; everything else as compact JSON.
pub fn result_entries(result: &PublishResult) -> Vec<(String, String)> {
    result
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

/// Read a status log. Later lines win over earlier ones with the same key.
///
/// Lines without a `": "` separator are ignored.
pub fn read_status_log(path: &Path) -> Result<BTreeMap<String, String>, PackError> {
    let file = File::open(path).map_err(|source| PackError::StatusLog {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let mut entries = BTreeMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some((key, value)) = line.trim().split_once(": ") {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    Ok(entries)
}

/// Ask the repository for the status of the submission recorded in `path`.
pub fn check_status(
    path: &Path,
    repository: &mut dyn Repository,
) -> Result<PublishResult, PackError> {
    let entries = read_status_log(path)?;
    let source_id = entries
        .get(SOURCE_ID_KEY)
        .ok_or_else(|| PackError::StatusLog {
            path: path.to_path_buf(),
            message: format!("no '{}' entry; was a dataset published?", SOURCE_ID_KEY),
        })?;

    repository.check_status(source_id)
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
