//! Document assembly.
//!
//! This module turns a populated [`Registry`] into one PDF:
//! - Materialization of every input (see [`crate::materialize`])
//! - Page grafting in registry order
//! - Info dictionary
//! - Atomic save
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::assemble::Assembler;
//! use pdfstitch::config::{Limits, PageSpec};
//! use pdfstitch::registry::Registry;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! registry.add_pdf("a.pdf")?;
//! registry.add_image("b.png")?;
//!
//! let assembler = Assembler::new(PageSpec::default(), Limits::default());
//! let stats = assembler.save(&registry, Path::new("combined.pdf")).await?;
//! println!("Wrote {} pages", stats.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod metadata;
pub mod pages;

pub use assembler::{AssembleResult, Assembler, StitchStatistics};
pub use metadata::MetadataManager;

use crate::config::Config;
use crate::error::Result;
use crate::registry::Registry;

/// Stitch the inputs of `config` into its output file.
///
/// Convenience function that registers every input, then assembles and
/// saves with the configured page settings, limits and metadata.
///
/// # Errors
///
/// Returns the first registration or input error, or a write error.
pub async fn stitch(config: &Config) -> Result<StitchStatistics> {
    let mut registry = Registry::new();
    registry.add_all(config.inputs())?;

    Assembler::from_config(config)
        .save(&registry, &config.output)
        .await
}
