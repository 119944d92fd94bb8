//! CLI argument parsing for pdfstitch.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, conversion into a [`Config`], and reading
//! `--input-list` files.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use pdfstitch::config::{
    CompressionLevel, Config, Limits, Metadata, Orientation, OverwriteMode, PageSize, PageSpec,
};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::utils::expand_inputs;

/// Stitch PDF documents and images into a single PDF.
///
/// PDF pages are copied as they are; each image becomes one page, scaled
/// to fit and centered.
#[derive(Parser, Debug)]
#[command(name = "pdfstitch")]
#[command(version)]
#[command(about = "Stitch PDF documents and images into a single PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Verbose output - show details and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stitch the given inputs, in order, into one PDF
    ///
    /// Examples:
    ///   pdfstitch stitch -i cover.pdf scan.jpg -o out.pdf
    ///   pdfstitch stitch -i 'chapters/*.pdf' -o book.pdf
    Stitch(StitchArgs),

    /// Print information about PDF and image files
    Info(InfoArgs),

    /// Stitch every supported file in a directory, sorted by name
    StitchDirectory(DirectoryArgs),
}

/// Arguments of `pdfstitch stitch`.
#[derive(Args, Debug, Clone)]
pub struct StitchArgs {
    /// Input files (PDF, PNG, JPEG, GIF, BMP, TIFF) in output order
    ///
    /// Arguments containing `*`, `?` or `[` are expanded as glob patterns.
    #[arg(short, long = "input", value_name = "FILE", num_args = 1..)]
    pub inputs: Vec<String>,

    /// Read more input paths from a file (one per line, '#' comments)
    ///
    /// Use '-' to read from stdin. Paths are appended after --input.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    #[command(flatten)]
    pub build: BuildArgs,
}

/// Arguments of `pdfstitch stitch-directory`.
#[derive(Args, Debug, Clone)]
pub struct DirectoryArgs {
    /// Directory to collect inputs from
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Output PDF path, relative paths are resolved against DIR
    #[arg(short, long, value_name = "FILE", default_value = "combined.pdf")]
    pub output: PathBuf,

    /// Only include file names matching this glob
    #[arg(long, value_name = "GLOB", default_value = "*")]
    pub pattern: String,

    #[command(flatten)]
    pub build: BuildArgs,
}

impl DirectoryArgs {
    /// Output path with relative paths resolved against the directory.
    pub fn output_path(&self) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            self.dir.join(&self.output)
        }
    }
}

/// Arguments of `pdfstitch info`.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Files to inspect
    #[arg(required = true, value_name = "FILE")]
    pub paths: Vec<PathBuf>,

    /// Print one JSON document instead of text
    #[arg(long)]
    pub json: bool,

    /// Number of files inspected concurrently
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

/// Options shared by the commands that produce a PDF.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Dry run - read every input and assemble in memory without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for output PDF
    ///
    /// - none: streams are written as produced
    /// - standard: compress streams (default)
    /// - maximum: also drop unreferenced objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Number of inputs read concurrently (default: number of CPU cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Largest accepted input file, in MiB
    #[arg(long, value_name = "MIB", default_value_t = 256)]
    pub max_file_size: u64,

    /// Page orientation for image pages
    #[arg(long, value_name = "ORIENTATION", env = "PDFSTITCH_ORIENTATION")]
    #[arg(default_value = "portrait", value_parser = ["portrait", "landscape"])]
    pub orientation: String,

    /// Page size for image pages: a3, a4, a5, letter, legal or WxH in points
    #[arg(long, value_name = "SIZE", env = "PDFSTITCH_PAGE_SIZE", default_value = "a4")]
    pub page_size: String,

    /// JPEG re-encoding quality for image pages
    #[arg(long, value_name = "0-100", env = "PDFSTITCH_QUALITY", default_value_t = 85)]
    #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: u8,
}

impl BuildArgs {
    /// Convert the arguments into a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::InvalidConfig`] for unparsable options or a
    /// configuration that fails validation.
    pub fn to_config(
        &self,
        inputs: Vec<PathBuf>,
        output: PathBuf,
        verbose: bool,
        quiet: bool,
    ) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;
        let page_spec = PageSpec {
            orientation: Orientation::from_str(&self.orientation)?,
            size: PageSize::from_str(&self.page_size)?,
            quality: self.quality,
        };

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let limits = Limits {
            max_file_size: self.max_file_size.saturating_mul(1024 * 1024),
            ..Limits::default()
        };

        let config = Config {
            inputs,
            output,
            page_spec,
            limits,
            dry_run: self.dry_run,
            verbose,
            quiet,
            overwrite_mode,
            compression,
            metadata: Metadata::new(
                self.title.clone(),
                self.author.clone(),
                self.subject.clone(),
                self.keywords.clone(),
            ),
            jobs: self.jobs,
        };

        config.validate()?;
        Ok(config)
    }
}

impl StitchArgs {
    /// All inputs: `--input` values with globs expanded, then the input list.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern matches nothing, the input list cannot
    /// be read, or no inputs remain.
    pub async fn all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut inputs = expand_inputs(&self.inputs)?;

        if let Some(list) = &self.input_list {
            inputs.extend(read_input_list(list).await?);
        }

        if inputs.is_empty() {
            return Err(StitchError::EmptyInput);
        }

        Ok(inputs)
    }
}

/// Read input paths from a list file, or stdin for `-`.
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |err: std::io::Error| {
        StitchError::invalid_config(format!(
            "Failed to read input list {}: {err}",
            path.display()
        ))
    };

    if path.as_os_str() == "-" {
        parse_input_list(BufReader::new(tokio::io::stdin()))
            .await
            .map_err(read_error)
    } else {
        let file = tokio::fs::File::open(path).await.map_err(read_error)?;
        parse_input_list(BufReader::new(file))
            .await
            .map_err(read_error)
    }
}

/// One path per line; blank lines and lines starting with '#' are skipped.
async fn parse_input_list<R>(reader: R) -> std::io::Result<Vec<PathBuf>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut paths = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}
