//! Integration tests for stitching PDFs and images.

use pdfstitch::assemble::{Assembler, stitch};
use pdfstitch::assemble::MetadataManager;
use pdfstitch::config::{
    CompressionLevel, Config, Limits, Metadata, Orientation, PageSize, PageSpec,
};
use pdfstitch::registry::Registry;
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{
    approx, image_placements, page_sizes, write_jpeg, write_pdf, write_png,
    write_protected_pdf, write_transparent_png,
};

const A4: (f32, f32) = (595.2756, 841.8898);

#[tokio::test]
async fn test_stitch_pdf_and_image() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 3, 500);
    let b = write_png(dir.path(), "b.png", 400, 200);
    let output = dir.path().join("out.pdf");

    let mut registry = Registry::new();
    registry.add_pdf(&a).unwrap();
    registry.add_image(&b).unwrap();

    let stats = Assembler::default().save(&registry, &output).await.unwrap();
    assert_eq!(stats.files_stitched, 2);
    assert_eq!(stats.pdf_files, 1);
    assert_eq!(stats.image_files, 1);
    assert_eq!(stats.total_pages, 4);
    assert!(stats.output_size.unwrap() > 0);

    let sizes = page_sizes(&output);
    assert_eq!(sizes.len(), 4);
    for (i, &(width, height)) in sizes[..3].iter().enumerate() {
        assert!(approx(width, 500.0));
        assert!(approx(height, 700.0 + i as f32));
    }
    assert!(approx(sizes[3].0, A4.0) && approx(sizes[3].1, A4.1));
}

#[tokio::test]
async fn test_owner_password_pdf_is_stitched() {
    let dir = TempDir::new().unwrap();
    let protected = write_protected_pdf(dir.path(), "owner.pdf", 2, "x", "");
    let b = write_png(dir.path(), "b.png", 100, 100);
    let output = dir.path().join("out.pdf");

    let mut registry = Registry::new();
    registry.add_all([&protected, &b]).unwrap();

    let stats = Assembler::default().save(&registry, &output).await.unwrap();
    assert_eq!(stats.total_pages, 3);

    let doc = lopdf::Document::load(&output).unwrap();
    assert!(!doc.trailer.has(b"Encrypt"));
    assert_eq!(page_sizes(&output).len(), 3);
}

#[tokio::test]
async fn test_creates_missing_output_directory() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 1, 612);
    let output = dir.path().join("nested").join("out.pdf");

    let mut registry = Registry::new();
    registry.add_pdf(&a).unwrap();

    Assembler::default().save(&registry, &output).await.unwrap();
    assert_eq!(page_sizes(&output).len(), 1);
}

#[tokio::test]
async fn test_reordering_inputs_reorders_pages() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(dir.path(), "a.pdf", 2, 300);
    let b = write_jpeg(dir.path(), "b.jpg", 64, 32);
    let c = write_pdf(dir.path(), "c.pdf", 1, 450);

    let widths = |path: &std::path::Path| -> Vec<i32> {
        page_sizes(path)
            .into_iter()
            .map(|(width, _)| width.round() as i32)
            .collect()
    };

    let forward = dir.path().join("forward.pdf");
    let mut registry = Registry::new();
    registry.add_all([&a, &b, &c]).unwrap();
    Assembler::default().save(&registry, &forward).await.unwrap();

    let backward = dir.path().join("backward.pdf");
    let mut registry = Registry::new();
    registry.add_all([&c, &b, &a]).unwrap();
    Assembler::default().save(&registry, &backward).await.unwrap();

    assert_eq!(widths(&forward), vec![300, 300, 595, 450]);
    assert_eq!(widths(&backward), vec![450, 595, 300, 300]);
}

#[tokio::test]
async fn test_save_twice_is_structurally_identical() {
    let dir = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry
        .add_all([
            write_png(dir.path(), "wide.png", 300, 100),
            write_pdf(dir.path(), "doc.pdf", 2, 612),
            write_transparent_png(dir.path(), "alpha.png", 50, 80),
        ])
        .unwrap();

    let assembler = Assembler::default();
    let first = dir.path().join("first.pdf");
    let second = dir.path().join("second.pdf");
    assembler.save(&registry, &first).await.unwrap();
    assembler.save(&registry, &second).await.unwrap();

    assert_eq!(page_sizes(&first), page_sizes(&second));
    assert_eq!(image_placements(&first), image_placements(&second));
    assert_eq!(image_placements(&first).len(), 2);
}

#[tokio::test]
async fn test_parallel_materialization_keeps_order() {
    let dir = TempDir::new().unwrap();
    let mut registry = Registry::new();
    for i in 0..6 {
        let width = 200 + i * 10;
        registry
            .add(write_pdf(dir.path(), &format!("{i}.pdf"), 1, width))
            .unwrap();
    }

    let output = dir.path().join("out.pdf");
    Assembler::default()
        .with_jobs(4)
        .save(&registry, &output)
        .await
        .unwrap();

    let widths: Vec<i32> = page_sizes(&output)
        .into_iter()
        .map(|(width, _)| width.round() as i32)
        .collect();
    assert_eq!(widths, vec![200, 210, 220, 230, 240, 250]);
}

#[rstest]
#[case(400, 200, PageSize::A4, Orientation::Portrait)]
#[case(200, 400, PageSize::A4, Orientation::Landscape)]
#[case(1000, 1000, PageSize::Letter, Orientation::Portrait)]
#[case(31, 977, PageSize::A5, Orientation::Landscape)]
#[tokio::test]
async fn test_image_keeps_aspect_ratio(
    #[case] width: u32,
    #[case] height: u32,
    #[case] size: PageSize,
    #[case] orientation: Orientation,
) {
    let dir = TempDir::new().unwrap();
    let image = write_png(dir.path(), "img.png", width, height);
    let output = dir.path().join("out.pdf");

    let spec = PageSpec {
        orientation,
        size,
        ..PageSpec::default()
    };
    let mut registry = Registry::new();
    registry.add_image(&image).unwrap();
    Assembler::new(spec, Limits::default())
        .save(&registry, &output)
        .await
        .unwrap();

    let (page_width, page_height) = page_sizes(&output)[0];
    let (expected_width, expected_height) = spec.dimensions();
    assert!(approx(page_width, expected_width as f32));
    assert!(approx(page_height, expected_height as f32));

    let cm = &image_placements(&output)[0];
    let (drawn_width, drawn_height, x, y) = (cm[0], cm[3], cm[4], cm[5]);
    let ratio = width as f32 / height as f32;
    assert!((drawn_width / drawn_height - ratio).abs() / ratio < 1e-3);
    assert!(drawn_width <= page_width + 0.01);
    assert!(drawn_height <= page_height + 0.01);
    assert!(approx(x * 2.0 + drawn_width, page_width));
    assert!(approx(y * 2.0 + drawn_height, page_height));
}

#[tokio::test]
async fn test_stitch_from_config() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("combined.pdf");

    let mut config = Config::new(
        vec![
            write_pdf(dir.path(), "a.pdf", 1, 612),
            write_jpeg(dir.path(), "b.jpeg", 20, 10),
        ],
        &output,
    );
    config.compression = CompressionLevel::Maximum;
    config.metadata = Metadata::new(
        Some("Quarterly report".to_string()),
        Some("Finance".to_string()),
        None,
        None,
    );
    config.jobs = Some(2);
    config.validate().unwrap();

    let stats = stitch(&config).await.unwrap();
    assert_eq!(stats.total_pages, 2);

    let doc = lopdf::Document::load(&output).unwrap();
    let metadata = MetadataManager::new().get_metadata(&doc);
    assert_eq!(metadata.title.as_deref(), Some("Quarterly report"));
    assert_eq!(metadata.author.as_deref(), Some("Finance"));
    assert_eq!(metadata.subject, None);
}
