//! Bounded file loading for the dissection session.
//!
//! `SafeReader` memory-maps a file and enforces resource limits so that a
//! huge or hostile file cannot exhaust memory before it reaches a dissector.
//! [`load_file`] produces the immutable byte snapshot a session works on.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Defines the resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
    /// The maximum number of bytes copied into the snapshot.
    pub max_read_bytes: u64,
}

impl Default for IoLimits {
    fn default() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024, // 256MB
            max_read_bytes: 256 * 1024 * 1024,
        }
    }
}

/// A file handed to the session: its display name and an immutable snapshot of its bytes.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A bounded file reader backed by a read-only memory map.
pub struct SafeReader {
    path: PathBuf,
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
    limits: IoLimits,
    file_size: u64,
}

impl SafeReader {
    /// Opens and memory-maps a file.
    ///
    /// Fails if the file size exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IoLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening file for dissection"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the snapshot is copied out before use.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            limits,
            file_size,
        })
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// Copies the whole file into an immutable snapshot.
    ///
    /// # Errors
    ///
    /// Returns `IoError::ReadLimitExceeded` if the file is larger than
    /// `limits.max_read_bytes`.
    pub fn read_all(&self) -> Result<Bytes> {
        if self.file_size > self.limits.max_read_bytes {
            warn!(
                path = %self.path.display(),
                requested = self.file_size,
                limit = self.limits.max_read_bytes,
                "Read limit exceeded"
            );
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                requested: self.file_size,
            });
        }

        let out = match &self.mmap {
            Some(map) => Bytes::copy_from_slice(map),
            None => Bytes::new(),
        };
        trace!(path = %self.path.display(), len = out.len(), "Read file");
        Ok(out)
    }
}

/// Loads a whole file into an immutable snapshot for the session.
pub fn load_file<P: AsRef<Path>>(path: P, limits: IoLimits) -> Result<LoadedFile> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| IoError::NoFileName(path.display().to_string()))?;
    let reader = SafeReader::open(path, limits)?;
    let bytes = reader.read_all()?;
    debug!(file = %file_name, size = reader.size(), "File loaded");
    Ok(LoadedFile { file_name, bytes })
}
