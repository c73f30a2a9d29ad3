//! Sheet rendering
//!
//! Draws every placement of a [`SheetLayout`] onto a page bitmap.

use image::{RgbImage, imageops};

use crate::layout::{SheetLayout, compute_sheet_layout, photo_placements};
use crate::marks::draw_cut_guide;
use crate::options::{CutGuideStyle, SheetOptions};
use crate::photo::{FinalSheet, NormalizedPhoto};
use crate::types::*;

/// Page appearance for tiling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStyle {
    /// Fixed gap above, between and below rows (pixels)
    pub vertical_margin: u32,
    pub page_background: Color,
    pub cut_guide: CutGuideStyle,
}

impl From<&SheetOptions> for TileStyle {
    fn from(options: &SheetOptions) -> Self {
        Self {
            vertical_margin: options.vertical_margin_px,
            page_background: options.page_background,
            cut_guide: options.cut_guide,
        }
    }
}

impl Default for TileStyle {
    fn default() -> Self {
        TileStyle::from(&SheetOptions::default())
    }
}

/// Render `columns` copies per row of `photo` onto a `page_width` x `page_height` page.
///
/// A layout without any row is not an error: the page comes back blank and
/// callers decide whether to warn.
///
/// # Errors
/// `LayoutInfeasible` when `columns` photos do not fit across the page.
pub fn tile(
    photo: &NormalizedPhoto,
    page_width: u32,
    page_height: u32,
    columns: u32,
    style: &TileStyle,
) -> Result<FinalSheet> {
    let (photo_width, photo_height) = photo.dimensions();
    let layout = compute_sheet_layout(
        (page_width, page_height),
        (photo_width, photo_height),
        columns,
        style.vertical_margin,
    )?;

    Ok(render_layout(photo, layout, style))
}

/// Render an already computed layout
pub fn render_layout(photo: &NormalizedPhoto, layout: SheetLayout, style: &TileStyle) -> FinalSheet {
    let placements = photo_placements(&layout);
    let (photo_width, photo_height) = photo.dimensions();

    let mut page = RgbImage::from_pixel(
        layout.page_width,
        layout.page_height,
        style.page_background.to_rgb(),
    );

    for placement in &placements {
        let (x, y) = placement.pixel_origin();
        imageops::replace(&mut page, &photo.image, x, y);
        draw_cut_guide(&mut page, x, y, photo_width, photo_height, &style.cut_guide);
    }

    if layout.is_empty() {
        log::warn!(
            "No {}x{} photo fits on the {}x{} page",
            photo_width,
            photo_height,
            layout.page_width,
            layout.page_height
        );
    } else {
        log::info!(
            "Rendered {} photos ({} columns x {} rows)",
            placements.len(),
            layout.columns,
            layout.rows
        );
    }

    FinalSheet {
        image: page,
        layout,
        placements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const PHOTO_COLOR: Rgb<u8> = Rgb([200, 10, 10]);

    fn photo(width: u32, height: u32) -> NormalizedPhoto {
        NormalizedPhoto {
            image: RgbImage::from_pixel(width, height, PHOTO_COLOR),
            background: Color::WHITE,
        }
    }

    #[test]
    fn test_a4_passport_sheet() {
        let sheet = tile(&photo(413, 531), 2480, 3508, 4, &TileStyle::default()).unwrap();

        assert_eq!(sheet.image.dimensions(), (2480, 3508));
        assert_eq!(sheet.placed_count(), 24);
        assert_eq!(sheet.layout.rows, 6);
        assert!((sheet.layout.horizontal_spacing - 165.6).abs() < 1e-9);
    }

    #[test]
    fn test_photos_and_guides_are_drawn() {
        let style = TileStyle::default();
        let sheet = tile(&photo(413, 531), 2480, 3508, 4, &style).unwrap();
        let guide = style.cut_guide.color.to_rgb();
        let page = style.page_background.to_rgb();

        // First photo drawn at (round(165.6), 20) = (166, 20)
        assert_eq!(sheet.image.get_pixel(166, 20), &guide);
        assert_eq!(sheet.image.get_pixel(166 + 200, 20 + 200), &PHOTO_COLOR);
        assert_eq!(sheet.image.get_pixel(165, 20), &page);
        assert_eq!(sheet.image.get_pixel(166, 19), &page);
        // Last photo's bottom-right guide pixel
        let last = sheet.placements.last().unwrap();
        let (x, y) = last.pixel_origin();
        assert_eq!(
            sheet.image.get_pixel((x + 412) as u32, (y + 530) as u32),
            &guide
        );
        // Page corner stays blank
        assert_eq!(sheet.image.get_pixel(2479, 3507), &page);
    }

    #[test]
    fn test_rounded_positions_do_not_overlap() {
        let sheet = tile(&photo(413, 531), 2480, 3508, 5, &TileStyle::default()).unwrap();
        let mut previous_right = i64::MIN;
        for placement in sheet.placements.iter().filter(|p| p.grid_pos.row == 0) {
            let (x, _) = placement.pixel_origin();
            assert!(x >= previous_right);
            previous_right = x + 413;
        }
        assert!(previous_right <= 2480);
    }

    #[test]
    fn test_infeasible_columns() {
        let result = tile(&photo(413, 531), 2480, 3508, 7, &TileStyle::default());
        assert!(matches!(result, Err(PhotoError::LayoutInfeasible { .. })));
    }

    #[test]
    fn test_zero_rows_renders_blank_page() {
        let style = TileStyle::default();
        let sheet = tile(&photo(100, 4000), 2480, 3508, 2, &style).unwrap();

        assert_eq!(sheet.placed_count(), 0);
        assert!(sheet.layout.is_empty());
        let page = style.page_background.to_rgb();
        assert!(sheet.image.pixels().all(|p| *p == page));
    }

    #[test]
    fn test_jpeg_download() {
        let sheet = tile(&photo(40, 50), 200, 300, 2, &TileStyle::default()).unwrap();
        let jpeg = sheet.to_jpeg(90).unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 300));
    }
}
