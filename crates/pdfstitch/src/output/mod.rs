//! Output formatting and display for pdfstitch.
//!
//! This module handles all user-facing output:
//! - Status messages in quiet and verbose modes
//! - Stitch summaries
//! - Per-file inspection reports
//!
//! # Examples
//!
//! ```no_run
//! use pdfstitch::output::OutputFormatter;
//! use pdfstitch::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Stitching inputs");
//! formatter.success("Done");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::assemble::StitchStatistics;
use crate::info::{FileDetails, FileInfo, InspectSummary};

/// Display the summary of a finished (or dry-run) stitch.
pub fn display_stitch_statistics(formatter: &OutputFormatter, stats: &StitchStatistics) {
    let mut line = format!(
        "Stitched {} file(s) ({} pdf, {} image): {} pages from {}",
        stats.files_stitched,
        stats.pdf_files,
        stats.image_files,
        stats.total_pages,
        stats.format_input_size()
    );
    if let Some(output_size) = stats.format_output_size() {
        line.push_str(&format!(", wrote {output_size}"));
    }
    formatter.success(&line);

    formatter.detail(
        "Materialize time",
        &format!("{:.2}s", stats.materialize_time.as_secs_f64()),
    );
    formatter.detail(
        "Assemble time",
        &format!("{:.2}s", stats.assemble_time.as_secs_f64()),
    );
    if let Some(write_time) = stats.write_time {
        formatter.detail("Write time", &format!("{:.2}s", write_time.as_secs_f64()));
    }
}

/// Human-readable lines describing one inspected file.
pub fn describe_file_info(info: &FileInfo) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", info.path.display(), info.format),
        format!("  Size: {} ({} bytes)", info.size_human, info.size),
    ];

    match &info.details {
        FileDetails::Pdf {
            page_count,
            version,
            first_page_size,
            encrypted,
        } => {
            if let Some(version) = version {
                lines.push(format!("  Version: {version}"));
            }
            if *encrypted {
                lines.push("  Encrypted: yes".to_string());
            } else {
                lines.push(format!("  Pages: {page_count}"));
            }
            if let Some((width, height)) = first_page_size {
                lines.push(format!("  First page: {width:.0} x {height:.0} pt"));
            }
        }
        FileDetails::Image {
            width,
            height,
            color_type,
        } => {
            lines.push(format!("  Dimensions: {width} x {height} px"));
            lines.push(format!("  Color type: {color_type}"));
        }
    }

    lines
}

/// Display one inspected file.
pub fn display_file_info(formatter: &OutputFormatter, info: &FileInfo) {
    for line in describe_file_info(info) {
        formatter.info(&line);
    }
}

/// Display the totals of an inspection batch.
pub fn display_inspect_summary(formatter: &OutputFormatter, summary: &InspectSummary) {
    if summary.files_failed > 0 {
        formatter.warning(&format!(
            "{} file(s) could not be inspected",
            summary.files_failed
        ));
    }

    formatter.info(&format!(
        "Inspected {} file(s): {} pages, {}",
        summary.files_ok,
        summary.total_pages,
        summary.format_total_size()
    ));
}
