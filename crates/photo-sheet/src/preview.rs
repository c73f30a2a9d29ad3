use image::{DynamicImage, RgbaImage};

use crate::photo::FinalSheet;

/// Downscaled copy of the sheet for on-screen display.
///
/// The aspect ratio is kept and the longer side is at most `max_dimension`.
/// Sheets that already fit are returned at full size.
pub fn generate_preview(sheet: &FinalSheet, max_dimension: u32) -> RgbaImage {
    let (width, height) = sheet.image.dimensions();
    let page = DynamicImage::ImageRgb8(sheet.image.clone());

    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return page.to_rgba8();
    }

    page.thumbnail(max_dimension, max_dimension).to_rgba8()
}
