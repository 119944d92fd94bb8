//! I/O operations for pdfstitch.
//!
//! This module handles all file I/O operations including:
//! - Size-limited reading of inputs
//! - Parsing PDFs and classifying encrypted or corrupt ones
//! - Atomic writing of the stitched document
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::io::{SourceReader, PdfWriter};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = SourceReader::new().load(Path::new("input.pdf")).await?;
//! PdfWriter::new().save(loaded.document, Path::new("copy.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, SourceReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
