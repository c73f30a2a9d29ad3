//! Bitmap artifacts passed from one pipeline stage to the next
//!
//! Each artifact is produced once from its predecessor and owns its pixels;
//! dropping it releases the buffer.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;

use crate::layout::{PhotoPlacement, SheetLayout};
use crate::types::*;

/// The photo as uploaded. Only the header is read up front; pixels are
/// decoded when the crop is applied.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Bytes,
    width: u32,
    height: u32,
}

impl SourceImage {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        let (width, height) = ImageReader::new(Cursor::new(&bytes[..]))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| PhotoError::UnsupportedImage(e.to_string()))?;

        Ok(Self {
            bytes,
            width,
            height,
        })
    }

    /// Read an image file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub(crate) fn decode(&self) -> Result<DynamicImage> {
        image::load_from_memory(&self.bytes).map_err(|e| {
            PhotoError::InvalidRegion(format!("source image could not be decoded: {e}"))
        })
    }
}

/// Crop output, optionally shifted so the face sits on the vertical centre
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPhoto {
    image: RgbaImage,
}

impl AlignedPhoto {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// PNG payload sent to the background removal service
    pub fn to_png(&self) -> Result<Bytes> {
        let mut buf = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| PhotoError::CompositionFailure(format!("PNG encoding failed: {e}")))?;
        Ok(Bytes::from(buf.into_inner()))
    }
}

/// Matte flattened onto a solid colour; fully opaque
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPhoto {
    pub image: RgbImage,
    pub background: Color,
}

/// Photo at the exact target pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPhoto {
    pub image: RgbImage,
    pub background: Color,
}

impl NormalizedPhoto {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Rendered page with every placed photo
#[derive(Debug, Clone)]
pub struct FinalSheet {
    pub image: RgbImage,
    pub layout: SheetLayout,
    pub placements: Vec<PhotoPlacement>,
}

impl FinalSheet {
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Encode for download
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality)
            .encode_image(&self.image)
            .map_err(|e| PhotoError::CompositionFailure(format!("JPEG encoding failed: {e}")))?;
        Ok(buf)
    }
}
