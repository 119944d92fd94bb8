//! Fixture builders shared by the integration tests.
//!
//! Every fixture is generated into a temporary directory at runtime.

#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::{Document, Object, dictionary};
use std::path::{Path, PathBuf};

/// Write a PDF with `pages` pages. Page `i` has a media box of
/// `width` x `700 + i` points so tests can tell pages apart.
pub fn write_pdf(dir: &Path, name: &str, pages: usize, width: i64) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = (0..pages)
        .map(|i| {
            let content = format!("BT /F1 12 Tf 72 72 Td (page {i}) Tj ET");
            let content_id = doc.add_object(lopdf::Stream::new(
                dictionary! {},
                content.into_bytes(),
            ));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), (700 + i as i64).into()],
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).expect("write pdf fixture");
    path
}

/// Write an opaque RGB PNG.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 30, 30])))
        .save(&path)
        .expect("write png fixture");
    path
}

/// Write a half-transparent RGBA PNG.
pub fn write_transparent_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 128])))
        .save(&path)
        .expect("write png fixture");
    path
}

/// Write an RGB JPEG.
pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 120, 10])))
        .save(&path)
        .expect("write jpeg fixture");
    path
}

/// Write bytes that no decoder accepts.
pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\x00\x01 definitely not a real file \xff\xfe").expect("write garbage");
    path
}

/// Write a one-page PDF whose trailer carries an `/Encrypt` dictionary.
pub fn write_encrypted_pdf(dir: &Path, name: &str) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "P" => -4,
        "O" => Object::string_literal(vec![0u8; 32]),
        "U" => Object::string_literal(vec![0u8; 32]),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Encrypt", encrypt_id);

    let path = dir.join(name);
    doc.save(&path).expect("write encrypted fixture");
    path
}

/// Write a PDF like [`write_pdf`] and encrypt it with the given passwords.
/// An empty user password gives a file that opens without one.
pub fn write_protected_pdf(
    dir: &Path,
    name: &str,
    pages: usize,
    owner: &str,
    user: &str,
) -> PathBuf {
    let path = write_pdf(dir, name, pages, 400);
    let mut doc = Document::load(&path).expect("reload pdf fixture");
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal(vec![1u8; 16]),
            Object::string_literal(vec![2u8; 16]),
        ],
    );
    let state = lopdf::EncryptionState::try_from(lopdf::EncryptionVersion::V2 {
        document: &doc,
        owner_password: owner,
        user_password: user,
        key_length: 128,
        permissions: lopdf::Permissions::all(),
    })
    .expect("encryption state");
    doc.encrypt(&state).expect("encrypt pdf fixture");
    doc.save(&path).expect("write protected fixture");
    path
}

/// Media box (width, height) of every page of the PDF at `path`, in order.
pub fn page_sizes(path: &Path) -> Vec<(f32, f32)> {
    let doc = Document::load(path).expect("load output");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).expect("page dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("media box");
            let value = |i: usize| media_box[i].as_float().expect("number");
            (value(2) - value(0), value(3) - value(1))
        })
        .collect()
}

/// Operands of the `cm` operator on every image page of the PDF at `path`.
pub fn image_placements(path: &Path) -> Vec<Vec<f32>> {
    let doc = Document::load(path).expect("load output");
    doc.get_pages()
        .into_values()
        .filter_map(|id| {
            let content = doc.get_page_content(id).ok()?;
            let content = lopdf::content::Content::decode(&content).ok()?;
            let has_image = content.operations.iter().any(|op| op.operator == "Do");
            if !has_image {
                return None;
            }
            content
                .operations
                .iter()
                .find(|op| op.operator == "cm")
                .map(|op| {
                    op.operands
                        .iter()
                        .map(|operand| operand.as_float().expect("number"))
                        .collect()
                })
        })
        .collect()
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}
