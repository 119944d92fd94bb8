//! Integration tests for file inspection.

use pdfstitch::error::StitchError;
use pdfstitch::info::{FileDetails, InspectSummary, Inspector, inspect};
use tempfile::TempDir;

use crate::common::{
    write_encrypted_pdf, write_garbage, write_jpeg, write_pdf, write_protected_pdf,
};

#[tokio::test]
async fn test_inspect_multi_page_pdf() {
    let dir = TempDir::new().unwrap();
    let pdf = write_pdf(dir.path(), "report.pdf", 3, 500);

    let info = inspect(&pdf).await.unwrap();
    assert_eq!(info.name, "report.pdf");
    assert_eq!(info.page_count(), 3);
    match info.details {
        FileDetails::Pdf {
            page_count,
            first_page_size,
            encrypted,
            ..
        } => {
            assert_eq!(page_count, 3);
            assert_eq!(first_page_size, Some((500.0, 700.0)));
            assert!(!encrypted);
        }
        other => panic!("expected pdf details, got {other:?}"),
    }
}

#[tokio::test]
async fn test_inspect_reports_encryption() {
    let dir = TempDir::new().unwrap();
    let pdf = write_encrypted_pdf(dir.path(), "locked.pdf");

    let info = inspect(&pdf).await.unwrap();
    assert!(matches!(
        info.details,
        FileDetails::Pdf {
            encrypted: true,
            page_count: 0,
            ..
        }
    ));
}

#[tokio::test]
async fn test_inspect_owner_password_pdf() {
    let dir = TempDir::new().unwrap();
    let pdf = write_protected_pdf(dir.path(), "owner.pdf", 2, "x", "");

    let info = inspect(&pdf).await.unwrap();
    assert!(matches!(
        info.details,
        FileDetails::Pdf {
            encrypted: false,
            page_count: 2,
            ..
        }
    ));
}

#[tokio::test]
async fn test_inspect_all_reports_each_file() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_jpeg(dir.path(), "photo.jpg", 16, 9),
        write_garbage(dir.path(), "broken.pdf"),
        write_pdf(dir.path(), "doc.pdf", 2, 612),
    ];

    let outcomes = Inspector::new().inspect_all(&paths, 3).await;
    let returned: Vec<_> = outcomes.iter().map(|(path, _)| path.clone()).collect();
    assert_eq!(returned, paths);

    match &outcomes[0].1 {
        Ok(info) => assert!(matches!(
            info.details,
            FileDetails::Image {
                width: 16,
                height: 9,
                ..
            }
        )),
        Err(err) => panic!("jpeg failed: {err}"),
    }
    assert!(matches!(
        outcomes[1].1,
        Err(StitchError::CorruptDocument { .. })
    ));
    assert!(outcomes[2].1.is_ok());

    let summary = InspectSummary::from_outcomes(&outcomes);
    assert_eq!(summary.files_ok, 2);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.total_pages, 3);
}
