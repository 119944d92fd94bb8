//! pdfstitch - Stitch PDF documents and raster images into a single PDF.
//!
//! Inputs are registered in order, each one is turned into pages (imported
//! PDF pages, or one fitted page per image) and the pages are assembled
//! into one document that is written atomically.
//!
//! - PDF pages are copied with everything they reference
//! - PNG, JPEG, GIF, BMP and TIFF images are scaled to fit and centered
//! - Per-file size, pixel and decode limits plus a per-item timeout
//! - Optional document metadata and compression
//!
//! # Examples
//!
//! ## Stitch from a configuration
//!
//! ```no_run
//! use pdfstitch::assemble;
//! use pdfstitch::config::{Config, Orientation, PageSize};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::new(
//!     vec![PathBuf::from("cover.pdf"), PathBuf::from("scan.jpg")],
//!     "combined.pdf",
//! );
//! config.page_spec.size = PageSize::Letter;
//! config.page_spec.orientation = Orientation::Landscape;
//! config.validate()?;
//!
//! let stats = assemble::stitch(&config).await?;
//! println!("Created {} page document", stats.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using individual components
//!
//! ```no_run
//! use pdfstitch::{Assembler, Registry};
//! use pdfstitch::config::{Limits, PageSpec};
//! use pdfstitch::info::Inspector;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let info = Inspector::new().inspect(Path::new("report.pdf")).await?;
//! println!("{} has {} pages", info.name, info.page_count());
//!
//! let mut registry = Registry::new();
//! registry.add_pdf("report.pdf")?;
//! registry.add_image("chart.png")?;
//!
//! let result = Assembler::new(PageSpec::default(), Limits::default())
//!     .assemble(&registry)
//!     .await?;
//! println!("{} pages in memory", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assemble;
pub mod config;
pub mod error;
pub mod info;
pub mod io;
pub mod materialize;
pub mod output;
pub mod registry;
pub mod utils;

// Re-export commonly used types
pub use assemble::Assembler;
pub use config::Config;
pub use error::{Result, StitchError};
pub use registry::Registry;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
