use image::imageops;

use crate::photo::{AlignedPhoto, SourceImage};
use crate::types::*;

/// Rasterize the crop region of `source` into a new bitmap.
///
/// The UI rectangle is multiplied by the region's scale factors to get
/// source-pixel coordinates. The result is clamped to the image bounds.
pub fn extract(source: &SourceImage, region: &CropRegion) -> Result<AlignedPhoto> {
    if !(region.width > 0.0 && region.height > 0.0) {
        return Err(PhotoError::InvalidRegion(format!(
            "size {}x{} is not positive",
            region.width, region.height
        )));
    }
    if !(region.scale_x > 0.0 && region.scale_y > 0.0)
        || !region.scale_x.is_finite()
        || !region.scale_y.is_finite()
    {
        return Err(PhotoError::InvalidRegion(format!(
            "scale {}x{} is not positive",
            region.scale_x, region.scale_y
        )));
    }

    let image = source.decode()?;
    let (image_width, image_height) = (image.width() as f64, image.height() as f64);

    // Intersect the mapped rectangle with the image; never negative
    let mapped_left = (region.x * region.scale_x).round();
    let mapped_top = (region.y * region.scale_y).round();
    let mapped_right = mapped_left + (region.width * region.scale_x).round();
    let mapped_bottom = mapped_top + (region.height * region.scale_y).round();

    let left = mapped_left.clamp(0.0, image_width);
    let top = mapped_top.clamp(0.0, image_height);
    let width = mapped_right.clamp(0.0, image_width) - left;
    let height = mapped_bottom.clamp(0.0, image_height) - top;

    if !(width >= 1.0 && height >= 1.0) {
        return Err(PhotoError::InvalidRegion(format!(
            "region at ({}, {}) lies outside the {}x{} source",
            region.x, region.y, image_width, image_height
        )));
    }

    log::debug!(
        "Cropping {}x{} at ({}, {}) from {}x{} source",
        width,
        height,
        left,
        top,
        image_width,
        image_height
    );

    let cropped = imageops::crop_imm(
        &image,
        left as u32,
        top as u32,
        width as u32,
        height as u32,
    )
    .to_image();

    Ok(AlignedPhoto::new(cropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Source whose pixel at (x, y) encodes its own coordinates
    fn gradient_source(width: u32, height: u32) -> SourceImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        SourceImage::from_bytes(buf.into_inner()).unwrap()
    }

    #[test]
    fn test_natural_region() {
        let source = gradient_source(200, 100);
        let photo = extract(&source, &CropRegion::natural(10.0, 20.0, 35.0, 45.0)).unwrap();

        assert_eq!((photo.width(), photo.height()), (35, 45));
        assert_eq!(photo.image().get_pixel(0, 0), &Rgba([10, 20, 0, 255]));
        assert_eq!(photo.image().get_pixel(34, 44), &Rgba([44, 64, 0, 255]));
    }

    #[test]
    fn test_displayed_region_is_scaled() {
        let source = gradient_source(200, 100);
        // Shown at half size: every UI pixel covers two source pixels
        let region =
            CropRegion::displayed(5.0, 2.0, 35.0, 45.0, (200, 100), (100, 50)).unwrap();
        let photo = extract(&source, &region).unwrap();

        assert_eq!((photo.width(), photo.height()), (70, 90));
        assert_eq!(photo.image().get_pixel(0, 0), &Rgba([10, 4, 0, 255]));
    }

    #[test]
    fn test_region_is_clamped_to_source() {
        let source = gradient_source(100, 100);
        let photo = extract(&source, &CropRegion::natural(-10.0, 80.0, 50.0, 50.0)).unwrap();

        assert_eq!((photo.width(), photo.height()), (40, 20));
        assert_eq!(photo.image().get_pixel(0, 0), &Rgba([0, 80, 0, 255]));
    }

    #[test]
    fn test_zero_size_region() {
        let source = gradient_source(100, 100);
        let result = extract(&source, &CropRegion::natural(0.0, 0.0, 0.0, 10.0));
        assert!(matches!(result, Err(PhotoError::InvalidRegion(_))));

        let result = extract(&source, &CropRegion::natural(0.0, 0.0, 10.0, -5.0));
        assert!(matches!(result, Err(PhotoError::InvalidRegion(_))));
    }

    #[test]
    fn test_region_outside_source() {
        let source = gradient_source(100, 100);
        let result = extract(&source, &CropRegion::natural(150.0, 0.0, 10.0, 10.0));
        assert!(matches!(result, Err(PhotoError::InvalidRegion(_))));
    }

    #[test]
    fn test_undecodable_source() {
        // Signature + IHDR (33 bytes), then the IDAT chunk header and a few data bytes
        let noise = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 7 + y * 13) as u8, (x * y) as u8, (x ^ y) as u8, 255])
        });
        let mut bytes = Vec::new();
        noise
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes.truncate(45);

        let source = SourceImage::from_bytes(bytes).unwrap();
        let result = extract(&source, &CropRegion::natural(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(result, Err(PhotoError::InvalidRegion(_))));
    }
}
