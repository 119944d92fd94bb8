//! Input reading and PDF loading.
//!
//! Every input goes through [`SourceReader`], which enforces the per-file size
//! limit before any bytes are read and classifies PDF parse failures.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::reader::SourceReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new();
//! let loaded = reader.load(Path::new("a.pdf")).await?;
//! println!("{} pages", loaded.page_count);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::config::Limits;
use crate::error::{Result, StitchError};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to read and parse the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

/// Reader that applies resource limits to every input it touches.
#[derive(Debug, Clone, Default)]
pub struct SourceReader {
    limits: Limits,
}

impl SourceReader {
    /// Create a reader with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with custom limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }

    /// Limits applied by this reader.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Size of `path` in bytes, checked against the file size limit.
    ///
    /// # Errors
    ///
    /// - [`StitchError::NotFound`] if the file is gone
    /// - [`StitchError::NotAFile`] if it is a directory
    /// - [`StitchError::LimitExceeded`] if it is larger than allowed
    pub fn check_size(&self, path: &Path) -> Result<u64> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StitchError::not_found(path),
            _ => StitchError::from(e),
        })?;

        if !metadata.is_file() {
            return Err(StitchError::not_a_file(path));
        }

        let size = metadata.len();
        if size > self.limits.max_file_size {
            return Err(StitchError::limit_exceeded(
                path,
                format!(
                    "file is {size} bytes, limit is {} bytes",
                    self.limits.max_file_size
                ),
            ));
        }

        Ok(size)
    }

    /// Read a whole input file into memory. Blocking.
    pub fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        self.check_size(path)?;
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StitchError::not_found(path),
            _ => StitchError::from(e),
        })
    }

    /// Read and parse a PDF. Blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read or exceeds the size limit
    /// - PDF is encrypted ([`StitchError::EncryptedDocument`])
    /// - PDF structure is corrupted ([`StitchError::CorruptDocument`])
    pub fn load_blocking(&self, path: &Path) -> Result<LoadedPdf> {
        let start = Instant::now();
        let bytes = self.read_bytes(path)?;
        let file_size = bytes.len() as u64;
        let document = parse_pdf(path, &bytes)?;
        let page_count = document.get_pages().len();
        let load_time = start.elapsed();

        debug!(
            path = %path.display(),
            page_count,
            file_size,
            ?load_time,
            "loaded pdf"
        );

        Ok(LoadedPdf {
            document,
            path: path.to_path_buf(),
            page_count,
            load_time,
            file_size,
        })
    }

    /// Read and parse a PDF on the blocking thread pool.
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let reader = self.clone();
        let path = path.to_path_buf();

        task::spawn_blocking(move || reader.load_blocking(&path))
            .await
            .map_err(|e| StitchError::other(format!("Load task failed: {e}")))?
    }
}

/// Parse PDF bytes, separating encrypted inputs from corrupt ones.
pub(crate) fn parse_pdf(path: &Path, bytes: &[u8]) -> Result<Document> {
    match Document::load_mem(bytes) {
        Ok(document) if is_locked(&document) => Err(StitchError::encrypted_document(path)),
        Ok(document) => Ok(document),
        Err(err) => {
            let message = err.to_string();
            if looks_encrypted(bytes, &message) {
                Err(StitchError::encrypted_document(path))
            } else {
                Err(StitchError::corrupt_document(path, message))
            }
        }
    }
}

/// True when the document is encrypted and could not be opened without a
/// password. Files that only carry an owner password are decrypted on load.
pub(crate) fn is_locked(document: &Document) -> bool {
    document.encryption_state.is_none()
        && (document.is_encrypted() || document.trailer.get(b"Encrypt").is_ok())
}

pub(crate) fn looks_encrypted(bytes: &[u8], message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("crypt")
        || message.contains("password")
        || bytes.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
}
