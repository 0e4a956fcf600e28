//! Session Store
//!
//! Where the prediction payload lives between the submission flow and the
//! report views. The pipeline only ever reads it.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

/// Errors raised by a [`ResultStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failure reading or writing the backing file.
    #[error("session store I/O failed for {path}: {source}")]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Narrow read/write interface over the persisted prediction payload.
pub trait ResultStore {
    /// Read the raw payload, or `None` when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing storage cannot be read.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replace the stored payload.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing storage cannot be written.
    fn write(&mut self, raw: &str) -> Result<(), StoreError>;

    /// Discard the stored payload.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing storage cannot be cleared.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-memory store, scoped to the lifetime of the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payload: Option<String>,
}

impl MemoryStore {
    /// Create a store already holding a payload.
    pub fn with_payload(raw: impl Into<String>) -> Self {
        Self {
            payload: Some(raw.into()),
        }
    }
}

impl ResultStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.payload.clone())
    }

    fn write(&mut self, raw: &str) -> Result<(), StoreError> {
        self.payload = Some(raw.to_string());

        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.payload = None;

        Ok(())
    }
}

/// Store backed by a single file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store for the given file. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ResultStore for FileStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn write(&mut self, raw: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        fs::write(&self.path, raw).map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), bytes = raw.len(), "stored payload");

        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }
}
