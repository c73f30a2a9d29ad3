//! Content placement within a fixed-size frame
//!
//! Used by the size normalizer to decide where a photo of arbitrary aspect
//! ratio is drawn on the target canvas.

use super::Rect;

/// Calculate where a `src_width` x `src_height` image is drawn on a
/// `target_width` x `target_height` canvas.
///
/// The aspect ratio is preserved. The image is scaled until it covers the
/// canvas on both axes and is centred; on the overflowing axis the offset is
/// negative and the canvas bounds crop the excess.
pub fn fit_to_target(src_width: u32, src_height: u32, target_width: u32, target_height: u32) -> Rect {
    let target_w = target_width as f64;
    let target_h = target_height as f64;

    // Compare width/height ratios by cross-multiplying to stay exact
    let wider = src_width as u64 * target_height as u64 > target_width as u64 * src_height as u64;

    if wider {
        // Wider than the target: match heights, overflow horizontally
        let draw_width = target_h * src_width as f64 / src_height as f64;
        Rect::new((target_w - draw_width) / 2.0, 0.0, draw_width, target_h)
    } else {
        // Taller (or equal): match widths, overflow vertically
        let draw_height = target_w * src_height as f64 / src_width as f64;
        Rect::new(0.0, (target_h - draw_height) / 2.0, target_w, draw_height)
    }
}
