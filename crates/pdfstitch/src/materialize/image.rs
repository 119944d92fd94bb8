//! Raster image decoding and encoding into PDF image XObjects.

use std::io::{Cursor, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageError, ImageReader};
use lopdf::{Dictionary, Object, Stream, dictionary};

use super::placement::Placement;
use crate::config::{Limits, PageSpec};
use crate::registry::ImageFormat;
use crate::{Result, StitchError};

/// Color space of encoded image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// One channel.
    DeviceGray,
    /// Three channels.
    DeviceRgb,
}

impl ColorSpace {
    fn pdf_name(self) -> &'static str {
        match self {
            Self::DeviceGray => "DeviceGray",
            Self::DeviceRgb => "DeviceRGB",
        }
    }
}

/// Compression applied to encoded image samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// Baseline JPEG.
    Dct,
    /// Zlib-compressed 8-bit samples.
    Flate,
}

impl ImageFilter {
    fn pdf_name(self) -> &'static str {
        match self {
            Self::Dct => "DCTDecode",
            Self::Flate => "FlateDecode",
        }
    }
}

/// Image samples ready to be embedded as an XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Sample color space.
    pub color_space: ColorSpace,
    /// Sample compression.
    pub filter: ImageFilter,
    /// Encoded samples.
    pub data: Vec<u8>,
    /// Flate-compressed 8-bit alpha channel, when the source is not opaque.
    pub soft_mask: Option<Vec<u8>>,
}

impl EncodedImage {
    /// Build the image XObject stream, plus its soft mask stream if any.
    ///
    /// The caller links the two by setting `SMask` on the image dictionary
    /// to the soft mask's object id.
    pub fn to_streams(&self) -> (Stream, Option<Stream>) {
        let dict = image_dictionary(
            self.width,
            self.height,
            self.color_space,
            self.filter,
        );
        let image = Stream::new(dict, self.data.clone());

        let mask = self.soft_mask.as_ref().map(|alpha| {
            let dict = image_dictionary(
                self.width,
                self.height,
                ColorSpace::DeviceGray,
                ImageFilter::Flate,
            );
            Stream::new(dict, alpha.clone())
        });

        (image, mask)
    }
}

fn image_dictionary(
    width: u32,
    height: u32,
    color_space: ColorSpace,
    filter: ImageFilter,
) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => Object::Name(color_space.pdf_name().as_bytes().to_vec()),
        "BitsPerComponent" => 8,
        "Filter" => Object::Name(filter.pdf_name().as_bytes().to_vec()),
    }
}

/// A synthesized page holding one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePage {
    /// Page width in points.
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    /// Where the image is drawn.
    pub placement: Placement,
    /// The image itself.
    pub image: EncodedImage,
}

/// Decode image bytes under `limits`, using the format resolved at add time.
pub(crate) fn decode(
    path: &Path,
    bytes: Vec<u8>,
    format: ImageFormat,
    limits: &Limits,
) -> Result<DynamicImage> {
    let mut decoder_limits = image::Limits::default();
    decoder_limits.max_image_width = Some(limits.max_image_width);
    decoder_limits.max_image_height = Some(limits.max_image_height);
    decoder_limits.max_alloc = Some(limits.max_decode_alloc);

    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format.to_image_format());
    reader.limits(decoder_limits);

    let image = reader.decode().map_err(|err| match err {
        ImageError::Limits(limit) => StitchError::limit_exceeded(path, limit.to_string()),
        other => StitchError::decode(path, other.to_string()),
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(StitchError::decode(path, "image has zero width or height"));
    }

    Ok(image)
}

/// Encode a decoded image for embedding.
///
/// Lossy sources are re-encoded as JPEG at `quality` (clamped to 1-100).
/// Everything else keeps exact samples under Flate.
pub(crate) fn encode(
    path: &Path,
    image: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> Result<EncodedImage> {
    let gray = matches!(
        image.color(),
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    );
    let color_space = if gray {
        ColorSpace::DeviceGray
    } else {
        ColorSpace::DeviceRgb
    };
    let (width, height) = (image.width(), image.height());

    let samples = match color_space {
        ColorSpace::DeviceGray => image.to_luma8().into_raw(),
        ColorSpace::DeviceRgb => image.to_rgb8().into_raw(),
    };

    if format.is_lossy() {
        let color_type = match color_space {
            ColorSpace::DeviceGray => ExtendedColorType::L8,
            ColorSpace::DeviceRgb => ExtendedColorType::Rgb8,
        };

        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100))
            .encode(&samples, width, height, color_type)
            .map_err(|e| StitchError::decode(path, format!("JPEG re-encoding failed: {e}")))?;

        return Ok(EncodedImage {
            width,
            height,
            color_space,
            filter: ImageFilter::Dct,
            data,
            soft_mask: None,
        });
    }

    let soft_mask = if image.color().has_alpha() {
        let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
        if alpha.iter().any(|&a| a < u8::MAX) {
            Some(zlib(path, &alpha)?)
        } else {
            None
        }
    } else {
        None
    };

    Ok(EncodedImage {
        width,
        height,
        color_space,
        filter: ImageFilter::Flate,
        data: zlib(path, &samples)?,
        soft_mask,
    })
}

fn zlib(path: &Path, raw: &[u8]) -> Result<Vec<u8>> {
    let failed =
        |e: std::io::Error| StitchError::other(format!("{}: compression failed: {e}", path.display()));

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).map_err(failed)?;
    encoder.finish().map_err(failed)
}

/// Decode, place and encode one image onto a page described by `spec`.
pub(crate) fn render_page(
    path: &Path,
    bytes: Vec<u8>,
    format: ImageFormat,
    spec: &PageSpec,
    limits: &Limits,
) -> Result<ImagePage> {
    let image = decode(path, bytes, format, limits)?;
    let (page_width, page_height) = spec.dimensions();
    let placement = Placement::fit(image.width(), image.height(), page_width, page_height);
    let image = encode(path, &image, format, spec.quality)?;

    Ok(ImagePage {
        page_width,
        page_height,
        placement,
        image,
    })
}
