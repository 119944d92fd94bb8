//! Fitting and centering an image on a page.

/// Where an image sits on its page, in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge in points.
    pub x: f64,
    /// Bottom edge in points.
    pub y: f64,
    /// Rendered width in points.
    pub width: f64,
    /// Rendered height in points.
    pub height: f64,
}

impl Placement {
    /// Scale an `image_width` x `image_height` pixel image to fit a
    /// `page_width` x `page_height` page and center it.
    ///
    /// The image fills the page along the constraining axis and keeps its
    /// aspect ratio. Pixel dimensions must be non-zero.
    pub fn fit(image_width: u32, image_height: u32, page_width: f64, page_height: f64) -> Self {
        let (w, h) = (f64::from(image_width), f64::from(image_height));
        let scale = (page_width / w).min(page_height / h);

        let width = (w * scale).min(page_width);
        let height = (h * scale).min(page_height);

        Self {
            x: (page_width - width) / 2.0,
            y: (page_height - height) / 2.0,
            width,
            height,
        }
    }
}
