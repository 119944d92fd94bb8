//! File inspection.
//!
//! Reports what pdfstitch sees in an input without assembling anything:
//! size and format for every file, page count, version, first page size and
//! encryption for PDFs, pixel dimensions and color type for images.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::info::Inspector;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let info = Inspector::new().inspect(Path::new("scan.png")).await?;
//! println!("{}: {}", info.name, info.size_human);
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt};
use image::{ImageDecoder, ImageReader};
use lopdf::{Document, Object};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::config::Limits;
use crate::error::{Result, StitchError};
use crate::io::SourceReader;
use crate::io::reader::{is_locked, looks_encrypted};
use crate::registry::{ImageFormat, SourceKind};
use crate::utils::format_file_size;

/// What was found inside a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FileDetails {
    /// A PDF document.
    #[serde(rename_all = "camelCase")]
    Pdf {
        /// Number of pages; zero when the document is encrypted.
        page_count: usize,
        /// Header version, e.g. "1.7".
        version: Option<String>,
        /// First page media box size in points.
        first_page_size: Option<(f32, f32)>,
        /// Whether the document is encrypted.
        encrypted: bool,
    },
    /// A raster image.
    #[serde(rename_all = "camelCase")]
    Image {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Decoder color type, e.g. "Rgb8".
        color_type: String,
    },
}

/// Report for one inspected file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// File name without directories.
    pub name: String,

    /// Path as given.
    pub path: PathBuf,

    /// Size in bytes.
    pub size: u64,

    /// Size formatted for humans.
    pub size_human: String,

    /// Detected format: "pdf", "png", "jpeg", "gif", "bmp" or "tiff".
    pub format: String,

    /// Format specific details.
    pub details: FileDetails,
}

impl FileInfo {
    /// Pages this file would contribute to a stitched document.
    pub fn page_count(&self) -> usize {
        match self.details {
            FileDetails::Pdf { page_count, .. } => page_count,
            FileDetails::Image { .. } => 1,
        }
    }
}

/// Aggregate over a batch of inspections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectSummary {
    /// Files inspected successfully.
    pub files_ok: usize,

    /// Files that could not be inspected.
    pub files_failed: usize,

    /// Pages across successful files.
    pub total_pages: usize,

    /// Bytes across successful files.
    pub total_size: u64,
}

impl InspectSummary {
    /// Summarize a batch of outcomes.
    pub fn from_outcomes(outcomes: &[(PathBuf, Result<FileInfo>)]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, (_, outcome)| {
                match outcome {
                    Ok(info) => {
                        summary.files_ok += 1;
                        summary.total_pages += info.page_count();
                        summary.total_size += info.size;
                    }
                    Err(_) => summary.files_failed += 1,
                }
                summary
            })
    }

    /// Format the total size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Inspector for PDF and image files.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    reader: SourceReader,
}

impl Inspector {
    /// Create an inspector with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inspector with custom limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            reader: SourceReader::with_limits(limits),
        }
    }

    /// Inspect a single file.
    ///
    /// An encrypted PDF is reported, not rejected.
    ///
    /// # Errors
    ///
    /// - [`StitchError::UnsupportedFormat`] for unknown extensions
    /// - [`StitchError::NotFound`] / [`StitchError::NotAFile`]
    /// - [`StitchError::CorruptDocument`] / [`StitchError::Decode`] for
    ///   unreadable contents
    pub async fn inspect(&self, path: &Path) -> Result<FileInfo> {
        let inspector = self.clone();
        let path = path.to_path_buf();

        task::spawn_blocking(move || inspector.inspect_blocking(&path))
            .await
            .map_err(|e| StitchError::other(format!("Inspect task failed: {e}")))?
    }

    /// Inspect every path, at most `jobs` at a time.
    ///
    /// Each file succeeds or fails on its own. Outcomes are returned in the
    /// order of `paths`.
    pub async fn inspect_all(
        &self,
        paths: &[PathBuf],
        jobs: usize,
    ) -> Vec<(PathBuf, Result<FileInfo>)> {
        stream::iter(paths)
            .map(|path| async move { (path.clone(), self.inspect(path).await) })
            .buffered(jobs.max(1))
            .collect()
            .await
    }

    fn inspect_blocking(&self, path: &Path) -> Result<FileInfo> {
        let kind =
            SourceKind::from_path(path).ok_or_else(|| StitchError::unsupported_format(path))?;
        let bytes = self.reader.read_bytes(path)?;
        let size = bytes.len() as u64;

        let (format, details) = match kind {
            SourceKind::Pdf => ("pdf", pdf_details(path, &bytes)?),
            SourceKind::Image(format) => (
                format.name(),
                image_details(path, bytes, format, self.reader.limits())?,
            ),
        };

        Ok(FileInfo {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            size,
            size_human: format_file_size(size),
            format: format.to_string(),
            details,
        })
    }
}

/// Inspect a single file with default limits.
pub async fn inspect(path: &Path) -> Result<FileInfo> {
    Inspector::new().inspect(path).await
}

/// Inspect many files with default limits, one at a time.
pub async fn inspect_all(paths: &[PathBuf]) -> Vec<(PathBuf, Result<FileInfo>)> {
    Inspector::new().inspect_all(paths, 1).await
}

fn pdf_details(path: &Path, bytes: &[u8]) -> Result<FileDetails> {
    let document = match Document::load_mem(bytes) {
        Ok(document) => document,
        Err(err) => {
            let message = err.to_string();
            if looks_encrypted(bytes, &message) {
                return Ok(FileDetails::Pdf {
                    page_count: 0,
                    version: header_version(bytes),
                    first_page_size: None,
                    encrypted: true,
                });
            }
            return Err(StitchError::corrupt_document(path, message));
        }
    };

    let encrypted = is_locked(&document);
    let pages = document.get_pages();
    let first_page_size = pages
        .values()
        .next()
        .and_then(|&id| media_box_size(&document, id));

    Ok(FileDetails::Pdf {
        page_count: if encrypted { 0 } else { pages.len() },
        version: Some(document.version.clone()),
        first_page_size,
        encrypted,
    })
}

/// Width and height of a page's media box, following the parent chain.
fn media_box_size(document: &Document, page_id: lopdf::ObjectId) -> Option<(f32, f32)> {
    let mut node = document.get_dictionary(page_id).ok()?;
    for _ in 0..64 {
        if let Ok(Object::Array(media_box)) = node.get(b"MediaBox")
            && media_box.len() >= 4
        {
            let width = media_box[2].as_float().ok()? - media_box[0].as_float().ok()?;
            let height = media_box[3].as_float().ok()? - media_box[1].as_float().ok()?;
            return Some((width.abs(), height.abs()));
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = document.get_dictionary(parent).ok()?;
    }
    None
}

fn header_version(bytes: &[u8]) -> Option<String> {
    let header = bytes.strip_prefix(b"%PDF-")?;
    let version: String = header
        .iter()
        .take_while(|b| b.is_ascii_digit() || **b == b'.')
        .map(|&b| char::from(b))
        .collect();
    (!version.is_empty()).then_some(version)
}

fn image_details(
    path: &Path,
    bytes: Vec<u8>,
    format: ImageFormat,
    limits: &Limits,
) -> Result<FileDetails> {
    let mut decoder_limits = image::Limits::default();
    decoder_limits.max_image_width = Some(limits.max_image_width);
    decoder_limits.max_image_height = Some(limits.max_image_height);
    decoder_limits.max_alloc = Some(limits.max_decode_alloc);

    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format.to_image_format());
    reader.limits(decoder_limits);

    let decoder = reader.into_decoder().map_err(|err| match err {
        image::ImageError::Limits(limit) => StitchError::limit_exceeded(path, limit.to_string()),
        other => StitchError::decode(path, other.to_string()),
    })?;
    let (width, height) = decoder.dimensions();

    Ok(FileDetails::Image {
        width,
        height,
        color_type: format!("{:?}", decoder.color_type()),
    })
}
