//! Ordered registry of stitch inputs.
//!
//! The registry records what to stitch and in which order. It only checks
//! that each path has a supported extension and names an existing file;
//! content is not read until the inputs are materialized.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Result, StitchError};

/// Raster formats accepted as image inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG (`.jpg` or `.jpeg`).
    Jpeg,
    /// Graphics Interchange Format.
    Gif,
    /// Windows bitmap.
    Bmp,
    /// Tagged Image File Format (`.tif` or `.tiff`).
    Tiff,
}

impl ImageFormat {
    /// Resolve a format from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Resolve a format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the source encoding is lossy.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg)
    }

    /// The matching decoder format in the `image` crate.
    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }

    /// Lowercase name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What kind of content a source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A PDF document; contributes all of its pages.
    Pdf,
    /// A raster image; contributes exactly one page.
    Image(ImageFormat),
}

impl SourceKind {
    /// Classify a path by extension. Returns `None` for unsupported files.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else {
            ImageFormat::from_extension(ext).map(Self::Image)
        }
    }

    /// Check whether a path has a supported extension.
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_some()
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Image(format) => write!(f, "image/{format}"),
        }
    }
}

/// One registered input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    kind: SourceKind,
    path: PathBuf,
    added_order: usize,
}

impl SourceItem {
    /// The resolved source kind.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Path as it was added.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zero-based insertion index.
    pub fn added_order(&self) -> usize {
        self.added_order
    }

    /// Whether this item is a PDF.
    pub fn is_pdf(&self) -> bool {
        matches!(self.kind, SourceKind::Pdf)
    }
}

/// Whether any inputs have been registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// No inputs.
    Empty,
    /// At least one input.
    Populated,
}

/// Ordered list of inputs to stitch.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    items: Vec<SourceItem>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a PDF document.
    ///
    /// # Errors
    ///
    /// - [`StitchError::UnsupportedFormat`] if the extension is not `.pdf`
    /// - [`StitchError::NotFound`] if the path does not exist
    /// - [`StitchError::NotAFile`] if the path is a directory
    pub fn add_pdf(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match SourceKind::from_path(path) {
            Some(SourceKind::Pdf) => self.push(SourceKind::Pdf, path),
            _ => Err(StitchError::unsupported_format(path)),
        }
    }

    /// Register a raster image.
    ///
    /// # Errors
    ///
    /// - [`StitchError::UnsupportedFormat`] for anything other than
    ///   png, jpg, jpeg, gif, bmp, tif or tiff
    /// - [`StitchError::NotFound`] if the path does not exist
    /// - [`StitchError::NotAFile`] if the path is a directory
    pub fn add_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match ImageFormat::from_path(path) {
            Some(format) => self.push(SourceKind::Image(format), path),
            None => Err(StitchError::unsupported_format(path)),
        }
    }

    /// Register a PDF or image, chosen by extension.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match SourceKind::from_path(path) {
            Some(kind) => self.push(kind, path),
            None => Err(StitchError::unsupported_format(path)),
        }
    }

    /// Register every path in order, stopping at the first failure.
    ///
    /// Items added before the failure stay registered.
    pub fn add_all<I, P>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.add(path)?;
        }
        Ok(())
    }

    fn push(&mut self, kind: SourceKind, path: &Path) -> Result<()> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StitchError::not_found(path));
            }
            Err(err) => return Err(err.into()),
        };

        if !metadata.is_file() {
            return Err(StitchError::not_a_file(path));
        }

        let added_order = self.items.len();
        debug!(path = %path.display(), %kind, added_order, "registered input");

        self.items.push(SourceItem {
            kind,
            path: path.to_path_buf(),
            added_order,
        });
        Ok(())
    }

    /// Registered inputs in insertion order.
    pub fn items(&self) -> &[SourceItem] {
        &self.items
    }

    /// Paths of the registered inputs in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(SourceItem::path)
    }

    /// Number of registered inputs.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current registry state.
    pub fn state(&self) -> RegistryState {
        if self.items.is_empty() {
            RegistryState::Empty
        } else {
            RegistryState::Populated
        }
    }

    /// Remove every registered input.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
