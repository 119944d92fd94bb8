//! Configuration module for pdfstitch.
//!
//! This module transforms CLI arguments into a validated, normalized configuration
//! that drives the stitching process. It handles:
//! - Output page geometry for image-derived pages
//! - Resource limits applied while reading inputs
//! - Validation of argument combinations
//! - Application of defaults

use anyhow::{Context, bail};

use crate::StitchError;
use std::{ops::RangeInclusive, path::PathBuf, str::FromStr, time::Duration};

/// One typographic point is 1/72 inch; one millimetre is 72 / 25.4 points.
const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Smallest and largest page side PDF allows, in points.
const PAGE_EXTENT_RANGE: RangeInclusive<f64> = 3.0..=14_400.0;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as produced.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress streams and prune unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = StitchError;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(StitchError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Orientation of image-derived pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Shorter side horizontal.
    #[default]
    Portrait,
    /// Longer side horizontal.
    Landscape,
}

impl FromStr for Orientation {
    type Err = StitchError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(StitchError::invalid_config(format!(
                "Invalid orientation: {s}. Must be one of: portrait, landscape"
            ))),
        }
    }
}

/// Paper size of image-derived pages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSize {
    /// ISO A3, 297 x 420 mm.
    A3,
    /// ISO A4, 210 x 297 mm.
    #[default]
    A4,
    /// ISO A5, 148 x 210 mm.
    A5,
    /// US Letter, 8.5 x 11 in.
    Letter,
    /// US Legal, 8.5 x 14 in.
    Legal,
    /// Arbitrary size in points.
    Custom {
        /// Width in points.
        width: f64,
        /// Height in points.
        height: f64,
    },
}

impl PageSize {
    /// Unoriented size in points, as `(width, height)`.
    pub fn points(&self) -> (f64, f64) {
        match *self {
            Self::A3 => (297.0 * POINTS_PER_MM, 420.0 * POINTS_PER_MM),
            Self::A4 => (210.0 * POINTS_PER_MM, 297.0 * POINTS_PER_MM),
            Self::A5 => (148.0 * POINTS_PER_MM, 210.0 * POINTS_PER_MM),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
            Self::Custom { width, height } => (width, height),
        }
    }

    fn parse_custom(s: &str) -> anyhow::Result<Self> {
        let Some((w, h)) = s.split_once(['x', 'X']) else {
            bail!("Invalid page size: {s}. Must be one of: a3, a4, a5, letter, legal, or WIDTHxHEIGHT in points");
        };

        let width: f64 = w
            .trim()
            .parse()
            .with_context(|| format!("Invalid page width: {w}"))?;
        let height: f64 = h
            .trim()
            .parse()
            .with_context(|| format!("Invalid page height: {h}"))?;

        let size = Self::Custom { width, height };
        size.check_bounds()?;
        Ok(size)
    }

    /// Custom sizes must lie within the page range PDF viewers accept.
    fn check_bounds(&self) -> anyhow::Result<()> {
        let (width, height) = self.points();
        if !(PAGE_EXTENT_RANGE.contains(&width) && PAGE_EXTENT_RANGE.contains(&height)) {
            bail!(
                "Page dimensions must be between {} and {} points, got {width}x{height}",
                PAGE_EXTENT_RANGE.start(),
                PAGE_EXTENT_RANGE.end()
            );
        }
        Ok(())
    }
}

impl FromStr for PageSize {
    type Err = StitchError;

    /// Parse a named paper size (case-insensitive) or `WIDTHxHEIGHT` in points.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "a3" => Ok(Self::A3),
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            _ => Self::parse_custom(s)
                .map_err(|err| StitchError::invalid_config(format!("{err:#}"))),
        }
    }
}

/// Geometry and encoding settings for pages synthesized from images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    /// Page orientation.
    pub orientation: Orientation,
    /// Paper size.
    pub size: PageSize,
    /// JPEG re-encoding quality, 0-100. Clamped to 1-100 when encoding.
    pub quality: u8,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            size: PageSize::A4,
            quality: 85,
        }
    }
}

impl PageSpec {
    /// Oriented page dimensions in points, as `(width, height)`.
    ///
    /// Portrait puts the shorter side horizontally, landscape the longer one,
    /// whatever order a custom size was given in.
    pub fn dimensions(&self) -> (f64, f64) {
        let (a, b) = self.size.points();
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        match self.orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

/// Resource bounds applied while reading and decoding inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest input file accepted, in bytes.
    pub max_file_size: u64,
    /// Largest image width accepted, in pixels.
    pub max_image_width: u32,
    /// Largest image height accepted, in pixels.
    pub max_image_height: u32,
    /// Largest allocation the image decoder may make, in bytes.
    pub max_decode_alloc: u64,
    /// Time budget for materializing a single input.
    pub item_timeout: Option<Duration>,
}

impl Limits {
    /// Default per-file size limit (256 MiB).
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 256 * 1024 * 1024;
    /// Default per-side pixel limit.
    pub const DEFAULT_MAX_IMAGE_SIDE: u32 = 20_000;
    /// Default decoder allocation limit (512 MiB).
    pub const DEFAULT_MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024;
    /// Default per-item timeout.
    pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(120);
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            max_image_width: Self::DEFAULT_MAX_IMAGE_SIDE,
            max_image_height: Self::DEFAULT_MAX_IMAGE_SIDE,
            max_decode_alloc: Self::DEFAULT_MAX_DECODE_ALLOC,
            item_timeout: Some(Self::DEFAULT_ITEM_TIMEOUT),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let trimmed = |opt: Option<String>| {
            opt.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            title: trimmed(title),
            author: trimmed(author),
            subject: trimmed(subject),
            keywords: trimmed(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a stitch operation.
///
/// Derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input file paths (in output order).
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Page geometry for image-derived pages.
    pub page_spec: PageSpec,

    /// Resource limits for reading inputs.
    pub limits: Limits,

    /// Dry run mode - validate without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// Number of parallel jobs (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Config {
    /// Create a configuration with defaults for everything but paths.
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            output: output.into(),
            page_spec: PageSpec::default(),
            limits: Limits::default(),
            dry_run: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            jobs: None,
        }
    }

    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidConfig`] if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - Quality is above 100
    /// - The output path is also an input
    pub fn validate(&self) -> crate::Result<()> {
        self.check()
            .map_err(|err| StitchError::invalid_config(format!("{err:#}")))
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if self.page_spec.quality > 100 {
            bail!(
                "Quality must be between 0 and 100, got {}",
                self.page_spec.quality
            );
        }

        self.page_spec.size.check_bounds()?;

        if self.limits.max_file_size == 0 {
            bail!("Maximum file size must be greater than zero");
        }

        for input in &self.inputs {
            if input == &self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        Ok(())
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
