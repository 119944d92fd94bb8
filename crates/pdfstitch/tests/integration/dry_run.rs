//! Integration tests for dry-run functionality.
//!
//! A dry run assembles in memory and never touches the output path.

use pdfstitch::assemble::Assembler;
use pdfstitch::config::Config;
use pdfstitch::registry::Registry;
use pdfstitch::utils::collect_directory;
use tempfile::TempDir;

use crate::common::{write_jpeg, write_pdf, write_png};

#[tokio::test]
async fn test_dry_run_does_not_create_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");

    let mut config = Config::new(
        vec![
            write_pdf(dir.path(), "a.pdf", 3, 612),
            write_png(dir.path(), "b.png", 10, 10),
        ],
        &output,
    );
    config.dry_run = true;
    config.validate().unwrap();

    let mut registry = Registry::new();
    registry.add_all(config.inputs()).unwrap();
    let result = Assembler::from_config(&config)
        .assemble(&registry)
        .await
        .unwrap();

    assert_eq!(result.statistics.total_pages, 4);
    assert_eq!(result.statistics.output_size, None);
    assert_eq!(result.sources, config.inputs);
    assert!(!output.exists(), "Output file should not be created in dry run");
}

#[tokio::test]
async fn test_dry_run_of_directory() {
    let dir = TempDir::new().unwrap();
    write_pdf(dir.path(), "02-body.pdf", 2, 612);
    write_jpeg(dir.path(), "01-cover.jpg", 30, 40);
    write_png(dir.path(), "03-appendix.png", 40, 30);
    std::fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

    let output = dir.path().join("combined.pdf");
    let inputs = collect_directory(dir.path(), "*", Some(&output)).unwrap();
    let names: Vec<_> = inputs
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["01-cover.jpg", "02-body.pdf", "03-appendix.png"]);

    let mut registry = Registry::new();
    registry.add_all(&inputs).unwrap();
    let result = Assembler::default().assemble(&registry).await.unwrap();
    assert_eq!(result.statistics.total_pages, 4);
    assert_eq!(result.statistics.image_files, 2);
    assert!(!output.exists());
}
