//! Error types for pdfstitch.
//!
//! Every failure in the stitching pipeline is reported as a [`StitchError`].
//! Errors that originate from a single input carry that input's path so the
//! caller can name the offending file.
//!
//! # Error Categories
//!
//! - **Input Errors**: missing files, directories, unsupported extensions
//! - **Content Errors**: corrupt PDFs, undecodable images, encrypted PDFs
//! - **Resource Errors**: size, pixel and time limits
//! - **Output Errors**: empty registry, unwritable or existing output

use std::io;
use std::path::{Path, PathBuf};

/// Result type alias for pdfstitch operations.
pub type Result<T> = std::result::Result<T, StitchError>;

/// Main error type for pdfstitch operations.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// The file extension is not a supported PDF or image type.
    #[error(
        "Unsupported format '{extension}': {}\n  \
         Supported inputs: pdf, png, jpg, jpeg, gif, bmp, tif, tiff",
        path.display()
    )]
    UnsupportedFormat {
        /// Path to the rejected file.
        path: PathBuf,
        /// The extension that was rejected (empty when there is none).
        extension: String,
    },

    /// PDF file could not be parsed or has no pages.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptDocument {
        /// Path to the PDF.
        path: PathBuf,
        /// What the parser reported.
        details: String,
    },

    /// Image file could not be decoded.
    #[error("Failed to decode image: {}\n  Details: {details}", path.display())]
    Decode {
        /// Path to the image.
        path: PathBuf,
        /// What the decoder reported.
        details: String,
    },

    /// PDF is password protected.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedDocument {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// A size, pixel or allocation limit was exceeded while reading an input.
    #[error("Input exceeds resource limits: {}\n  Details: {details}", path.display())]
    LimitExceeded {
        /// Path to the offending input.
        path: PathBuf,
        /// Which limit was hit.
        details: String,
    },

    /// Materializing an input took longer than the configured timeout.
    #[error("Timed out after {seconds}s while processing: {}", path.display())]
    TimedOut {
        /// Path to the offending input.
        path: PathBuf,
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// Save was requested with no inputs registered.
    #[error("No input files to stitch. Add PDFs or images first")]
    EmptyInput,

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Output file could not be created, written or moved into place.
    #[error("Failed to write output file: {}\n  Reason: {source}", path.display())]
    Write {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for StitchError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl StitchError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: impl Into<PathBuf>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Create an UnsupportedFormat error for `path`, capturing its extension.
    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::UnsupportedFormat { path, extension }
    }

    /// Create a CorruptDocument error.
    pub fn corrupt_document(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::CorruptDocument {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create a Decode error.
    pub fn decode(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an EncryptedDocument error.
    pub fn encrypted_document(path: impl Into<PathBuf>) -> Self {
        Self::EncryptedDocument { path: path.into() }
    }

    /// Create a LimitExceeded error.
    pub fn limit_exceeded(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::LimitExceeded {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: impl Into<PathBuf>) -> Self {
        Self::OutputExists { path: path.into() }
    }

    /// Create a Write error.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// The file this error originated from, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::NotAFile { path }
            | Self::UnsupportedFormat { path, .. }
            | Self::CorruptDocument { path, .. }
            | Self::Decode { path, .. }
            | Self::EncryptedDocument { path }
            | Self::LimitExceeded { path, .. }
            | Self::TimedOut { path, .. }
            | Self::OutputExists { path }
            | Self::Write { path, .. } => Some(path),
            Self::EmptyInput
            | Self::InvalidConfig { .. }
            | Self::Cancelled
            | Self::Io { .. }
            | Self::Other { .. } => None,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::UnsupportedFormat { .. } => 3,
            Self::CorruptDocument { .. } => 3,
            Self::Decode { .. } => 3,
            Self::EncryptedDocument { .. } => 3,
            Self::LimitExceeded { .. } => 3,
            Self::TimedOut { .. } => 3,
            Self::EmptyInput => 1,
            Self::OutputExists { .. } => 4,
            Self::Write { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
