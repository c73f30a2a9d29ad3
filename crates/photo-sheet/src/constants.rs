//! Shared constants for photo sheet generation
//!
//! This module centralizes magic numbers and constants used throughout
//! the pipeline.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Print resolution used when none is configured
pub const DEFAULT_DPI: u32 = 300;

/// Convert millimeters to whole pixels at the given resolution
#[inline]
pub fn mm_to_px(mm: f32, dpi: u32) -> u32 {
    (mm as f64 / MM_PER_INCH as f64 * dpi as f64).round().max(0.0) as u32
}

/// Convert pixels back to millimeters at the given resolution
#[inline]
pub fn px_to_mm(px: u32, dpi: u32) -> f32 {
    (px as f64 * MM_PER_INCH as f64 / dpi as f64) as f32
}

// =============================================================================
// Photo Dimensions
// =============================================================================

/// Passport photo width (mm)
pub const PASSPORT_WIDTH_MM: f32 = 35.0;

/// Passport photo height (mm)
pub const PASSPORT_HEIGHT_MM: f32 = 45.0;

// =============================================================================
// Sheet Layout
// =============================================================================

/// Vertical gap above, between and below photo rows (pixels)
pub const DEFAULT_VERTICAL_MARGIN_PX: u32 = 20;

/// Photos per row when the caller does not choose
pub const DEFAULT_COLUMNS: u32 = 4;

/// Page fill behind the tiled photos
pub const DEFAULT_PAGE_BACKGROUND: crate::Color = crate::Color::rgb(0xf0, 0xf0, 0xf0);

// =============================================================================
// Cut Guides
// =============================================================================

/// Stroke width for cut guides (pixels)
pub const CUT_GUIDE_WIDTH_PX: u32 = 1;

/// Widest stroke accepted for cut guides (pixels)
pub const MAX_CUT_GUIDE_WIDTH_PX: u32 = 2;

/// 30% black over the default page background
pub const CUT_GUIDE_COLOR: crate::Color = crate::Color::rgb(0xa8, 0xa8, 0xa8);

// =============================================================================
// Output
// =============================================================================

/// JPEG quality of the downloadable sheet
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Longest side of the on-screen sheet preview (pixels)
pub const PREVIEW_MAX_DIMENSION: u32 = 800;

// =============================================================================
// Background Removal
// =============================================================================

/// remove.bg v1 endpoint
pub const REMOVE_BG_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Environment variable holding the remove.bg API key
pub const REMOVE_BG_API_KEY_ENV: &str = "REMOVE_BG_API_KEY";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passport_size_at_300_dpi() {
        assert_eq!(mm_to_px(PASSPORT_WIDTH_MM, 300), 413);
        assert_eq!(mm_to_px(PASSPORT_HEIGHT_MM, 300), 531);
    }

    #[test]
    fn test_a4_at_300_dpi() {
        assert_eq!(mm_to_px(210.0, 300), 2480);
        assert_eq!(mm_to_px(297.0, 300), 3508);
    }

    #[test]
    fn test_px_to_mm() {
        assert!((px_to_mm(300, 300) - 25.4).abs() < 0.001);
    }
}
