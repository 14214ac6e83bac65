//! File storage sink for extracted data
//!
//! Writes one file per call into a configured directory, replacing any file
//! already at the target path.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid data storage directory \"{0}\"")]
    DirectoryMissing(PathBuf),

    #[error("Data storage directory \"{0}\" is not writable")]
    DirectoryNotWritable(PathBuf),

    #[error("Failed to save data to data file \"{path}\": {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Filename derived from a URL, safe to use as a single path component.
///
/// `http://localhost:5000` with extension `dat` becomes
/// `http%3A%2F%2Flocalhost%3A5000.dat`.
pub fn url_filename(url: &str, extension: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
    if extension.is_empty() {
        encoded
    } else {
        format!("{encoded}.{extension}")
    }
}

/// Overwriting file sink rooted at one directory
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `data` to `filename` inside the storage directory.
    ///
    /// The directory must already exist and be writable; it is never created
    /// here. Returns the path written.
    pub async fn store(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let metadata = match fs::metadata(&self.directory).await {
            Ok(metadata) if metadata.is_dir() => metadata,
            _ => return Err(StorageError::DirectoryMissing(self.directory.clone())),
        };

        if metadata.permissions().readonly() {
            return Err(StorageError::DirectoryNotWritable(self.directory.clone()));
        }

        let path = self.directory.join(filename.trim_end_matches(['/', '\\']));

        if fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            debug!("Removing existing data file {:?}", path);
            fs::remove_file(&path)
                .await
                .map_err(|source| self.write_error(&path, source))?;
        }

        fs::write(&path, data)
            .await
            .map_err(|source| self.write_error(&path, source))?;

        info!("💾 Stored {} bytes to {:?}", data.len(), path);
        Ok(path)
    }

    // Permission bits alone miss directories owned by another user
    fn write_error(&self, path: &Path, source: io::Error) -> StorageError {
        if source.kind() == io::ErrorKind::PermissionDenied {
            StorageError::DirectoryNotWritable(self.directory.clone())
        } else {
            StorageError::Write {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
