use image::imageops::{self, FilterType};
use image::RgbImage;
use std::borrow::Cow;

use crate::layout::fit_to_target;
use crate::photo::{ComposedPhoto, NormalizedPhoto};
use crate::types::*;

/// Rescale a composed photo to exactly `target_width` x `target_height`.
///
/// The aspect ratio is kept: the photo is scaled to cover the frame and
/// centred, with the overflowing edges cut off by the canvas. The canvas is
/// pre-filled with the photo's background so rounding never leaves a seam.
pub fn normalize(
    composed: ComposedPhoto,
    target_width: u32,
    target_height: u32,
) -> Result<NormalizedPhoto> {
    if target_width == 0 || target_height == 0 {
        return Err(PhotoError::CompositionFailure(format!(
            "target size {}x{} is empty",
            target_width, target_height
        )));
    }

    let ComposedPhoto { image, background } = composed;
    let (src_width, src_height) = image.dimensions();
    if src_width == 0 || src_height == 0 {
        return Err(PhotoError::CompositionFailure(
            "composed photo has no pixels".to_string(),
        ));
    }

    let draw = fit_to_target(src_width, src_height, target_width, target_height);
    let draw_width = draw.width.round().max(1.0) as u32;
    let draw_height = draw.height.round().max(1.0) as u32;

    log::debug!(
        "Normalizing {}x{} to {}x{} (drawn at {}x{}, offset {:.1},{:.1})",
        src_width,
        src_height,
        target_width,
        target_height,
        draw_width,
        draw_height,
        draw.x,
        draw.y
    );

    let scaled: Cow<'_, RgbImage> = if (draw_width, draw_height) == (src_width, src_height) {
        Cow::Borrowed(&image)
    } else {
        Cow::Owned(imageops::resize(
            &image,
            draw_width,
            draw_height,
            FilterType::Lanczos3,
        ))
    };

    let mut canvas = RgbImage::from_pixel(target_width, target_height, background.to_rgb());
    imageops::replace(
        &mut canvas,
        &*scaled,
        draw.x.round() as i64,
        draw.y.round() as i64,
    );

    Ok(NormalizedPhoto {
        image: canvas,
        background,
    })
}
