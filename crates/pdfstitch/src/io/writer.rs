//! PDF writing and saving operations.
//!
//! Output is always written atomically: the document is serialized into a
//! temporary file in the destination directory and renamed over the target
//! only once the whole write succeeded. A failed or abandoned write leaves
//! the destination untouched.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(doc, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info};

use crate::config::CompressionLevel;
use crate::error::{Result, StitchError};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// How much to compress the document before writing.
    pub compression: CompressionLevel,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::Standard,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression applied before writing.
    pub compression: CompressionLevel,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self {
            options: WriteOptions {
                compression,
                ..Default::default()
            },
        }
    }

    /// Save a PDF document to a file.
    pub async fn save(&self, doc: Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Write`] naming `path` if the temporary file
    /// cannot be created, serialized into or renamed into place.
    pub async fn save_with_stats(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || write_atomic(doc, path_buf, &options))
            .await
            .map_err(|e| StitchError::other(format!("Write task failed: {e}")))?
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without writing. Missing directories are
    /// created on save, so the nearest existing ancestor is checked instead.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::Write`] naming `path` if that ancestor is not
    /// a directory or is read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let mut dir = Path::new(".");
        for ancestor in output_dir(path).ancestors() {
            if !ancestor.as_os_str().is_empty()
                && tokio::fs::try_exists(ancestor).await.unwrap_or(false)
            {
                dir = ancestor;
                break;
            }
        }

        let metadata = tokio::fs::metadata(dir)
            .await
            .map_err(|e| StitchError::write(path, e))?;

        if !metadata.is_dir() {
            return Err(StitchError::write(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::NotADirectory,
                    format!("{} is not a directory", dir.display()),
                ),
            ));
        }

        if metadata.permissions().readonly() {
            return Err(StitchError::write(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("{} is not writable", dir.display()),
                ),
            ));
        }

        Ok(())
    }
}

fn output_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn apply_compression(doc: &mut Document, level: CompressionLevel) {
    match level {
        CompressionLevel::None => {}
        CompressionLevel::Standard => doc.compress(),
        CompressionLevel::Maximum => {
            let pruned = doc.prune_objects();
            debug!(pruned = pruned.len(), "pruned unreferenced objects");
            doc.renumber_objects();
            doc.compress();
        }
    }
}

fn write_atomic(mut doc: Document, path: PathBuf, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();
    apply_compression(&mut doc, options.compression);

    let to_write_error = |e: std::io::Error| StitchError::write(&path, e);

    let dir = output_dir(&path);
    std::fs::create_dir_all(dir).map_err(to_write_error)?;

    let temp = tempfile::Builder::new()
        .prefix(".pdfstitch-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(to_write_error)?;

    {
        let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, temp.as_file());
        doc.save_to(&mut writer)
            .map_err(|e| to_write_error(std::io::Error::other(e)))?;
        writer.flush().map_err(to_write_error)?;
    }
    temp.as_file().sync_all().map_err(to_write_error)?;

    let file = temp.persist(&path).map_err(|e| to_write_error(e.error))?;
    let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);
    let write_time = start.elapsed();

    info!(
        path = %path.display(),
        size = %format_file_size(file_size),
        ?write_time,
        "document written"
    );

    Ok(WriteStatistics {
        write_time,
        file_size,
        output_path: path,
        compression: options.compression,
    })
}
