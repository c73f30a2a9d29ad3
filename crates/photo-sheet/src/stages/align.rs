use image::{RgbaImage, imageops};

use crate::photo::AlignedPhoto;
use crate::types::FaceBox;

/// Shift the photo vertically so the face centre lands on the image centre.
///
/// Without a face box the photo is returned untouched. Only the vertical
/// position changes; content pushed out of the frame is clipped and the
/// uncovered band stays transparent until the background is composited.
pub fn align(photo: AlignedPhoto, face: Option<&FaceBox>) -> AlignedPhoto {
    let Some(face) = face else {
        return photo;
    };

    let face_center_y = face.center_y();
    if !face_center_y.is_finite() {
        log::warn!("Ignoring face box with non-finite centre: {:?}", face);
        return photo;
    }

    let image_center_y = photo.height() as f64 / 2.0;
    let offset_y = (image_center_y - face_center_y).round() as i64;
    if offset_y == 0 {
        return photo;
    }

    log::debug!("Aligning face: shifting content by {}px", offset_y);

    let mut shifted = RgbaImage::new(photo.width(), photo.height());
    imageops::replace(&mut shifted, photo.image(), 0, offset_y);
    AlignedPhoto::new(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Each row is filled with its own index so shifts are easy to read
    fn striped(width: u32, height: u32) -> AlignedPhoto {
        AlignedPhoto::new(RgbaImage::from_fn(width, height, |_, y| {
            Rgba([y as u8, 0, 0, 255])
        }))
    }

    #[test]
    fn test_no_face_is_identity() {
        let photo = striped(10, 20);
        let aligned = align(photo.clone(), None);
        assert_eq!(aligned, photo);
    }

    #[test]
    fn test_centered_face_is_identity() {
        let photo = striped(10, 20);
        let face = FaceBox::new(2.0, 6.0, 6.0, 8.0); // centre y = 10
        assert_eq!(align(photo.clone(), Some(&face)), photo);
    }

    #[test]
    fn test_high_face_moves_content_down() {
        let photo = striped(10, 20);
        let face = FaceBox::new(0.0, 0.0, 10.0, 8.0); // centre y = 4, offset = +6
        let aligned = align(photo, Some(&face));

        assert_eq!((aligned.width(), aligned.height()), (10, 20));
        // Exposed band at the top is transparent
        assert_eq!(aligned.image().get_pixel(3, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(aligned.image().get_pixel(3, 5), &Rgba([0, 0, 0, 0]));
        // Former row 0 now sits at row 6
        assert_eq!(aligned.image().get_pixel(3, 6), &Rgba([0, 0, 0, 255]));
        assert_eq!(aligned.image().get_pixel(3, 19), &Rgba([13, 0, 0, 255]));
    }

    #[test]
    fn test_low_face_moves_content_up() {
        let photo = striped(10, 20);
        let face = FaceBox::new(0.0, 12.0, 10.0, 6.0); // centre y = 15, offset = -5
        let aligned = align(photo, Some(&face));

        assert_eq!(aligned.image().get_pixel(0, 0), &Rgba([5, 0, 0, 255]));
        assert_eq!(aligned.image().get_pixel(0, 14), &Rgba([19, 0, 0, 255]));
        assert_eq!(aligned.image().get_pixel(0, 15), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_horizontal_position_is_kept() {
        let photo = AlignedPhoto::new(RgbaImage::from_fn(10, 10, |x, _| {
            Rgba([x as u8, 0, 0, 255])
        }));
        // Face far to the right and high up
        let face = FaceBox::new(8.0, 0.0, 2.0, 2.0);
        let aligned = align(photo, Some(&face));

        for x in 0..10 {
            assert_eq!(aligned.image().get_pixel(x, 9)[0], x as u8);
        }
    }
}
