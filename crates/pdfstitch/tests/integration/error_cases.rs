//! Integration tests for error handling and edge cases.

use pdfstitch::assemble::{Assembler, stitch};
use pdfstitch::config::{Config, Limits, PageSpec};
use pdfstitch::error::StitchError;
use pdfstitch::registry::Registry;
use rstest::rstest;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use crate::common::{
    write_encrypted_pdf, write_garbage, write_pdf, write_png, write_protected_pdf,
};

fn leftover_files(dir: &std::path::Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("out") || name.ends_with(".tmp"))
        })
        .collect()
}

#[tokio::test]
async fn test_empty_registry() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");

    let result = Assembler::default().save(&Registry::new(), &output).await;
    assert!(matches!(result, Err(StitchError::EmptyInput)));
    assert!(!output.exists());
}

#[rstest]
#[case("photo.webp")]
#[case("notes.txt")]
#[case("README")]
fn test_unsupported_extension(#[case] name: &str) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, b"data").unwrap();

    let mut registry = Registry::new();
    let err = registry.add_image(&path).unwrap_err();
    assert!(matches!(err, StitchError::UnsupportedFormat { .. }));
    assert_eq!(err.path(), Some(path.as_path()));
    assert_eq!(err.exit_code(), 3);
    assert!(registry.is_empty());
}

#[test]
fn test_missing_input() {
    let mut registry = Registry::new();
    let err = registry.add_pdf("/nonexistent/input.pdf").unwrap_err();
    assert!(matches!(err, StitchError::NotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_encrypted_pdf_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let encrypted = write_encrypted_pdf(dir.path(), "encrypted.pdf");
    let output = dir.path().join("out.pdf");

    let mut registry = Registry::new();
    registry.add_pdf(&encrypted).unwrap();

    let err = Assembler::default()
        .save(&registry, &output)
        .await
        .unwrap_err();
    assert!(
        matches!(err, StitchError::EncryptedDocument { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.path(), Some(encrypted.as_path()));
    assert!(leftover_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_user_password_pdf_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let locked = write_protected_pdf(dir.path(), "locked.pdf", 1, "x", "secret");
    let output = dir.path().join("out.pdf");

    let mut registry = Registry::new();
    registry.add_pdf(&locked).unwrap();

    let err = Assembler::default()
        .save(&registry, &output)
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::EncryptedDocument { .. }), "unexpected error: {err:?}");
    assert_eq!(err.path(), Some(locked.as_path()));
    assert!(leftover_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_item_timeout() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "a.pdf", 1, 612);
    let slow = write_png(dir.path(), "slow.png", 2400, 2400);
    let output = dir.path().join("out.pdf");

    let mut registry = Registry::new();
    registry.add_all([&pdf, &slow]).unwrap();

    let limits = Limits {
        item_timeout: Some(Duration::ZERO),
        ..Limits::default()
    };
    let err = Assembler::new(PageSpec::default(), limits)
        .save(&registry, &output)
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::TimedOut { .. }), "unexpected error: {err:?}");
    assert!(err.path().is_some_and(|path| path == pdf || path == slow));
    assert_eq!(err.exit_code(), 3);
    assert!(leftover_files(dir.path()).is_empty());
}

#[rstest]
#[case(1)]
#[case(3)]
#[tokio::test]
async fn test_corrupt_image_between_pdfs(#[case] jobs: usize) {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2, 612);
    let corrupt = write_garbage(dir.path(), "corrupt.jpg");
    let b = write_pdf(dir.path(), "b.pdf", 1, 612);
    let output = dir.path().join("out.pdf");

    let mut registry = Registry::new();
    registry.add_all([&a, &corrupt, &b]).unwrap();

    let err = Assembler::default()
        .with_jobs(jobs)
        .save(&registry, &output)
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::Decode { .. }), "unexpected error: {err:?}");
    assert_eq!(err.path(), Some(corrupt.as_path()));
    assert!(err.to_string().contains("corrupt.jpg"));
    assert!(leftover_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_first_error_in_registry_order_wins() {
    let dir = TempDir::new().unwrap();
    let bad_pdf = write_garbage(dir.path(), "bad.pdf");
    let bad_png = write_garbage(dir.path(), "bad.png");

    let mut registry = Registry::new();
    registry.add_all([&bad_pdf, &bad_png]).unwrap();

    let err = Assembler::default()
        .with_jobs(2)
        .assemble(&registry)
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::CorruptDocument { .. }));
    assert_eq!(err.path(), Some(bad_pdf.as_path()));
}

#[tokio::test]
async fn test_input_removed_after_registration() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "gone.pdf", 1, 612);

    let mut registry = Registry::new();
    registry.add_pdf(&pdf).unwrap();
    std::fs::remove_file(&pdf).unwrap();

    let err = Assembler::default().assemble(&registry).await.unwrap_err();
    assert!(matches!(err, StitchError::NotFound { .. }));
}

#[tokio::test]
async fn test_file_size_limit() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "big.pdf", 4, 612);

    let mut registry = Registry::new();
    registry.add_pdf(&pdf).unwrap();

    let limits = Limits {
        max_file_size: 64,
        ..Limits::default()
    };
    let err = Assembler::new(PageSpec::default(), limits)
        .assemble(&registry)
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::LimitExceeded { .. }));
}

#[tokio::test]
async fn test_pixel_limit() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "wide.png", 300, 10);

    let mut registry = Registry::new();
    registry.add_image(&png).unwrap();

    let limits = Limits {
        max_image_width: 100,
        ..Limits::default()
    };
    let err = Assembler::new(PageSpec::default(), limits)
        .assemble(&registry)
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::LimitExceeded { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_unwritable_output() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "a.pdf", 1, 612);
    let output = pdf.join("out.pdf");

    let mut registry = Registry::new();
    registry.add_pdf(&pdf).unwrap();

    let err = Assembler::default()
        .save(&registry, &output)
        .await
        .unwrap_err();
    assert!(matches!(err, StitchError::Write { .. }));
    assert_eq!(err.path(), Some(output.as_path()));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_config_output_equal_to_input() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "a.pdf", 1, 612);

    let config = Config::new(vec![pdf.clone()], &pdf);
    let err = config.validate().unwrap_err();
    assert!(matches!(err, StitchError::InvalidConfig { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_stitch_without_inputs() {
    let dir = TempDir::new().unwrap();
    let empty = Config::new(Vec::new(), dir.path().join("out.pdf"));
    assert!(matches!(
        stitch(&empty).await,
        Err(StitchError::EmptyInput)
    ));
}
