//! Face detection capability
//!
//! Detection is a best-effort refinement. The pipeline never fails because a
//! detector is missing or broken; it only loses the vertical re-centring.

use image::RgbaImage;

use crate::types::{FaceBox, PhotoError, Result};

/// Pluggable face detection backend.
///
/// Implementations return `Ok(None)` when no face is found and
/// `Err(PhotoError::DetectionUnavailable)` when the detector itself cannot run
/// (for instance, its model failed to load).
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &RgbaImage) -> Result<Option<FaceBox>>;
}

/// Detector that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect(&self, _image: &RgbaImage) -> Result<Option<FaceBox>> {
        Ok(None)
    }
}

/// Reports a box supplied from outside, e.g. by a separate detection tool
#[derive(Debug, Clone, Copy)]
pub struct FixedFaceBox(pub FaceBox);

impl FaceDetector for FixedFaceBox {
    fn detect(&self, image: &RgbaImage) -> Result<Option<FaceBox>> {
        let face = self.0;
        let inside = face.width > 0.0
            && face.height > 0.0
            && face.y < image.height() as f64
            && face.y + face.height > 0.0;
        Ok(inside.then_some(face))
    }
}

/// Run `detector`, folding every failure into "no face"
pub fn detect_face(detector: &dyn FaceDetector, image: &RgbaImage) -> Option<FaceBox> {
    match detector.detect(image) {
        Ok(face) => face,
        Err(PhotoError::DetectionUnavailable(reason)) => {
            log::warn!("Face detection unavailable, skipping alignment: {reason}");
            None
        }
        Err(e) => {
            log::warn!("Face detection failed, skipping alignment: {e}");
            None
        }
    }
}
