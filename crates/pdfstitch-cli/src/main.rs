//! pdfstitch - Stitch PDF documents and images into a single PDF.
//!
//! Command-line front end for the `pdfstitch` library.

mod cli;

use clap::Parser;
use std::io::{self, Write};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DirectoryArgs, InfoArgs, StitchArgs};
use pdfstitch::config::{Config, OverwriteMode};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::info::{InspectSummary, Inspector};
use pdfstitch::io::PdfWriter;
use pdfstitch::output::{
    OutputFormatter, display_file_info, display_inspect_summary, display_stitch_statistics,
};
use pdfstitch::utils::collect_directory;
use pdfstitch::{Assembler, Registry};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(err.exit_code());
        }
    }
}

/// Diagnostic logging to stderr, `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pdfstitch=debug"
    } else {
        "pdfstitch=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic. Returns the process exit code.
async fn run(cli: Cli) -> Result<i32> {
    let Cli {
        verbose,
        quiet,
        command,
    } = cli;

    match command {
        Command::Stitch(args) => run_stitch(args, verbose, quiet).await.map(|()| 0),
        Command::StitchDirectory(args) => run_directory(args, verbose, quiet).await.map(|()| 0),
        Command::Info(args) => run_info(args, verbose, quiet).await,
    }
}

async fn run_stitch(args: StitchArgs, verbose: bool, quiet: bool) -> Result<()> {
    let inputs = args.all_inputs().await?;
    let config = args
        .build
        .to_config(inputs, args.output.clone(), verbose, quiet)?;

    stitch(&config).await
}

async fn run_directory(args: DirectoryArgs, verbose: bool, quiet: bool) -> Result<()> {
    let output = args.output_path();
    let inputs = collect_directory(&args.dir, &args.pattern, Some(&output))?;
    if inputs.is_empty() {
        return Err(StitchError::EmptyInput);
    }

    let config = args.build.to_config(inputs, output, verbose, quiet)?;
    stitch(&config).await
}

/// Register, assemble and write according to `config`.
async fn stitch(config: &Config) -> Result<()> {
    let formatter = OutputFormatter::from_config(config);
    formatter.section(&format!("{} v{}", pdfstitch::NAME, pdfstitch::VERSION));

    let mut registry = Registry::new();
    registry.add_all(config.inputs())?;

    if config.dry_run || formatter.is_verbose() {
        for (index, item) in registry.items().iter().enumerate() {
            formatter.list_item(
                index + 1,
                &format!("{} ({})", item.path().display(), item.kind()),
            );
        }
    }

    let assembler = Assembler::from_config(config);

    if config.dry_run {
        formatter.info("Reading inputs...");
        let result = assembler.assemble(&registry).await?;
        display_stitch_statistics(&formatter, &result.statistics);
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output.display()));
        return Ok(());
    }

    PdfWriter::new().can_write(&config.output).await?;
    handle_output_overwrite(config, &formatter)?;

    formatter.info(&format!(
        "Stitching {} file(s) into {}",
        registry.len(),
        config.output.display()
    ));
    let stats = assembler.save(&registry, &config.output).await?;
    display_stitch_statistics(&formatter, &stats);

    if !config.metadata.is_empty() {
        formatter.detail("Metadata", "Set");
    }
    formatter.success(&format!("Created {}", config.output.display()));

    Ok(())
}

/// Inspect every path. Failures are reported per file and turn into a
/// non-zero exit code once all files have been processed.
async fn run_info(args: InfoArgs, verbose: bool, quiet: bool) -> Result<i32> {
    if args.jobs == Some(0) {
        return Err(StitchError::invalid_config(
            "Number of jobs must be at least 1",
        ));
    }
    let jobs = args.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let formatter = OutputFormatter::new(quiet, verbose);
    let outcomes = Inspector::new().inspect_all(&args.paths, jobs).await;
    let exit_code = outcomes
        .iter()
        .find_map(|(_, outcome)| outcome.as_ref().err().map(StitchError::exit_code))
        .unwrap_or(0);

    if args.json {
        let reports: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|(path, outcome)| match outcome {
                Ok(info) => serde_json::to_value(info)
                    .unwrap_or_else(|err| serde_json::json!({ "path": path, "error": err.to_string() })),
                Err(err) => serde_json::json!({ "path": path, "error": err.to_string() }),
            })
            .collect();
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|err| StitchError::other(format!("Failed to serialize report: {err}")))?;
        println!("{json}");
    }

    for (_, outcome) in &outcomes {
        match outcome {
            Ok(info) if !args.json => display_file_info(&formatter, info),
            Ok(_) => {}
            Err(err) => formatter.error(&err.to_string()),
        }
    }

    if !args.json && outcomes.len() > 1 {
        formatter.section("Summary");
        display_inspect_summary(&formatter, &InspectSummary::from_outcomes(&outcomes));
    }

    Ok(exit_code)
}

/// Handle output file overwrite scenarios.
fn handle_output_overwrite(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    if !config.output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(StitchError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask in quiet mode.
            if formatter.is_quiet() {
                return Err(StitchError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| StitchError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(StitchError::Cancelled)
            }
        }
    }
}
