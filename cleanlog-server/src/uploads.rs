//! Upload Handler
//!
//! Writes uploaded photos to the uploads directory under a generated
//! `<unix-millis>-<random>.<ext>` name and hands back the public path.
//! File content is never inspected.

use chrono::Utc;
use cleanlog_common::{Error, Result};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// URL prefix under which the uploads directory is served
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Upload limits per submission
pub const MAX_PHOTOS: usize = 10;
pub const MAX_PROBLEM_PHOTOS: usize = 1;

/// Destination directory for uploaded files
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the uploads directory if it does not exist
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one file and return its public path (`/uploads/<name>`)
    ///
    /// Fails with [`Error::Storage`] when the directory is not writable;
    /// no retry and no alternate location.
    pub async fn store(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        let filename = generate_filename(original_name);
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            error!("Failed to write upload {}: {}", path.display(), e);
            Error::Storage(format!("failed to write {}: {}", filename, e))
        })?;

        debug!("Stored upload {} ({} bytes)", filename, bytes.len());
        Ok(format!("{}/{}", UPLOADS_URL_PREFIX, filename))
    }

    /// Delete files previously returned by [`store`](Self::store)
    ///
    /// Used when a submission fails after some of its files were written.
    /// Paths outside this store and delete failures are logged and skipped.
    pub async fn discard(&self, public_paths: &[String]) {
        for public_path in public_paths {
            let Some(filename) = public_path
                .strip_prefix(UPLOADS_URL_PREFIX)
                .and_then(|rest| rest.strip_prefix('/'))
                .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
            else {
                warn!("Not discarding foreign upload path {}", public_path);
                continue;
            };

            match tokio::fs::remove_file(self.dir.join(filename)).await {
                Ok(()) => debug!("Discarded upload {}", filename),
                Err(e) => warn!("Failed to discard upload {}: {}", filename, e),
            }
        }
    }
}

/// `<unix-millis>-<0..1e9><.ext>`, keeping the original extension if any
fn generate_filename(original_name: Option<&str>) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..=1_000_000_000);
    format!("{}-{}{}", millis, random, extension_of(original_name))
}

/// Extension with its leading dot, or empty.
/// Only the final path component counts, so `../x.jpg` yields `.jpg`.
fn extension_of(original_name: Option<&str>) -> String {
    original_name
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}
