//! Staging-directory tunnel.
//!
//! Payloads are written into a directory that is already reachable at a public
//! base URL (a tunnel agent or static file host pointed at that directory).
//! Closing removes the file, which ends the exposure.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use super::Tunnel;
use crate::error::PackError;

/// Exposes payloads as files in a publicly served directory.
#[derive(Debug)]
pub struct StagingTunnel {
    dir: PathBuf,
    public_base: String,
    open_files: HashMap<String, PathBuf>,
    counter: u64,
}

impl StagingTunnel {
    pub fn new(dir: impl Into<PathBuf>, public_base: &str) -> Result<Self, PackError> {
        let parsed = url::Url::parse(public_base).map_err(|source| PackError::Tunnel {
            message: format!("invalid public URL '{}': {}", public_base, source),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PackError::Tunnel {
                message: format!("public URL '{}' must be http or https", public_base),
            });
        }

        Ok(Self {
            dir: dir.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
            open_files: HashMap::new(),
            counter: 0,
        })
    }

    /// URLs currently exposed.
    pub fn open_urls(&self) -> impl Iterator<Item = &str> {
        self.open_files.keys().map(String::as_str)
    }

    fn next_file_name(&mut self) -> String {
        self.counter += 1;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        format!(
            "mdfpack-{}-{}-{}.json",
            std::process::id(),
            nanos,
            self.counter
        )
    }
}

impl Tunnel for StagingTunnel {
    fn open(&mut self, payload: &[u8]) -> Result<String, PackError> {
        std::fs::create_dir_all(&self.dir)?;

        let file_name = self.next_file_name();
        let path = self.dir.join(&file_name);
        std::fs::write(&path, payload)?;

        let url = format!("{}/{}", self.public_base, file_name);
        debug!(%url, path = %path.display(), "staged payload");
        self.open_files.insert(url.clone(), path);
        Ok(url)
    }

    fn close(&mut self, public_url: &str) -> Result<(), PackError> {
        let path = self
            .open_files
            .remove(public_url)
            .ok_or_else(|| PackError::Tunnel {
                message: format!("'{}' is not open", public_url),
            })?;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PackError::Io(err)),
        }
    }
}
