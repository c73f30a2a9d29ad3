use image::RgbImage;

use crate::photo::ComposedPhoto;
use crate::types::*;

/// Flatten an alpha-matted image onto a solid background colour.
///
/// Standard "over" compositing: transparent pixels show the colour, opaque
/// pixels keep the subject, partial alpha blends proportionally.
pub fn compose(matted: &[u8], background: Color) -> Result<ComposedPhoto> {
    if matted.is_empty() {
        return Err(PhotoError::EmptyMatte);
    }

    let subject = image::load_from_memory(matted)
        .map_err(|e| PhotoError::CompositionFailure(format!("could not decode matte: {e}")))?
        .to_rgba8();

    let (width, height) = subject.dimensions();
    if width == 0 || height == 0 {
        return Err(PhotoError::CompositionFailure(
            "matte has no pixels".to_string(),
        ));
    }

    let mut image = RgbImage::from_pixel(width, height, background.to_rgb());
    for (dst, src) in image.pixels_mut().zip(subject.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            dst[c] = blend_channel(src[c], dst[c], alpha);
        }
    }

    Ok(ComposedPhoto { image, background })
}

/// `fg * a + bg * (1 - a)` on 8-bit values, rounded
#[inline]
fn blend_channel(fg: u8, bg: u8, alpha: u32) -> u8 {
    ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_empty_matte() {
        assert!(matches!(
            compose(&[], Color::WHITE),
            Err(PhotoError::EmptyMatte)
        ));
    }

    #[test]
    fn test_garbage_matte() {
        let result = compose(b"not an image", Color::WHITE);
        assert!(matches!(result, Err(PhotoError::CompositionFailure(_))));
    }

    #[test]
    fn test_alpha_blending() {
        let mut matte = RgbaImage::new(3, 1);
        matte.put_pixel(0, 0, Rgba([200, 100, 50, 0])); // fully transparent
        matte.put_pixel(1, 0, Rgba([200, 100, 50, 255])); // opaque
        matte.put_pixel(2, 0, Rgba([0, 0, 0, 128])); // half black

        let background = Color::rgb(0, 0, 255);
        let composed = compose(&png(&matte), background).unwrap();

        assert_eq!(composed.background, background);
        assert_eq!(composed.image.dimensions(), (3, 1));
        assert_eq!(composed.image.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(composed.image.get_pixel(1, 0), &Rgb([200, 100, 50]));
        // 255 * 127 / 255
        assert_eq!(composed.image.get_pixel(2, 0), &Rgb([0, 0, 127]));
    }

    #[test]
    fn test_opaque_input_passes_through() {
        let matte = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let composed = compose(&png(&matte), Color::WHITE).unwrap();
        assert!(composed.image.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }

    #[test]
    fn test_rgb_matte_without_alpha() {
        let mut buf = Cursor::new(Vec::new());
        RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        let composed = compose(&buf.into_inner(), Color::WHITE).unwrap();
        assert_eq!(composed.image.get_pixel(1, 1), &Rgb([1, 2, 3]));
    }
}
