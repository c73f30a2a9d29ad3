//! Cut guides for tiled photos
//!
//! A thin stroke around each photo marks where to trim. The stroke is drawn
//! on the photo's outermost pixels so it never spills into the gap or off
//! the page.

use image::RgbImage;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as PixelRect;

use crate::options::CutGuideStyle;

/// Stroke a cut guide around the `width` x `height` photo at (`x`, `y`)
pub fn draw_cut_guide(
    page: &mut RgbImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    style: &CutGuideStyle,
) {
    let color = style.color.to_rgb();

    // Concentric one-pixel rectangles, outermost first
    for inset in 0..style.width_px {
        let inner_width = width.saturating_sub(2 * inset);
        let inner_height = height.saturating_sub(2 * inset);
        if inner_width == 0 || inner_height == 0 {
            break;
        }

        let rect = PixelRect::at((x + inset as i64) as i32, (y + inset as i64) as i32)
            .of_size(inner_width, inner_height);
        draw_hollow_rect_mut(page, rect, color);
    }
}
