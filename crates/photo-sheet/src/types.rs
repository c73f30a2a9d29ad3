use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{PASSPORT_HEIGHT_MM, PASSPORT_WIDTH_MM, mm_to_px};

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
    #[error("Invalid crop region: {0}")]
    InvalidRegion(String),
    #[error("Face detection unavailable: {0}")]
    DetectionUnavailable(String),
    #[error("Background removal failed: {0}")]
    MatteServiceFailure(String),
    #[error("Background removal returned an empty image")]
    EmptyMatte,
    #[error("Image composition failed: {0}")]
    CompositionFailure(String),
    #[error(
        "{columns} photos of {photo_width}px do not fit across a {page_width}px page"
    )]
    LayoutInfeasible {
        columns: u32,
        photo_width: u32,
        page_width: u32,
    },
    #[error("A run is already in progress")]
    Busy,
    #[error("Invalid pipeline state: {0}")]
    InvalidState(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, PhotoError>;

/// Opaque RGB colour, written as `#rrggbb` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl FromStr for Color {
    type Err = PhotoError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || PhotoError::Config(format!("Invalid colour '{s}', expected #rrggbb"));

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // Shorthand: each digit is doubled (#abc == #aabbcc)
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = PhotoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Portrait dimensions in millimeters
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Pixel dimensions at the given print resolution
    pub fn dimensions_px(self, dpi: u32) -> (u32, u32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_px(w, dpi), mm_to_px(h, dpi))
    }
}

/// Physical size of one identity photo.
///
/// Only the 35 × 45 mm passport format is built in. Anything else has to be
/// configured explicitly as `Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhotoSize {
    #[default]
    Passport35x45,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PhotoSize {
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PhotoSize::Passport35x45 => (PASSPORT_WIDTH_MM, PASSPORT_HEIGHT_MM),
            PhotoSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    pub fn dimensions_px(self, dpi: u32) -> (u32, u32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_px(w, dpi), mm_to_px(h, dpi))
    }

    /// Width / height ratio, used to constrain the crop selection
    pub fn aspect_ratio(self) -> f64 {
        let (w, h) = self.dimensions_mm();
        w as f64 / h as f64
    }
}

/// Face bounding box reported by an external detector, in the pixel space
/// of the bitmap that was handed to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Crop rectangle chosen in the crop UI.
///
/// `x`, `y`, `width` and `height` are in displayed pixels; `scale_x` and
/// `scale_y` map them onto the source image (natural / displayed size).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl CropRegion {
    /// A region already expressed in source pixels
    pub fn natural(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// A region selected on an image shown at `display` size whose real size is `natural`
    pub fn displayed(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        natural: (u32, u32),
        display: (u32, u32),
    ) -> Result<Self> {
        if display.0 == 0 || display.1 == 0 {
            return Err(PhotoError::InvalidRegion(format!(
                "display size {}x{} is empty",
                display.0, display.1
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
            scale_x: natural.0 as f64 / display.0 as f64,
            scale_y: natural.1 as f64 / display.1 as f64,
        })
    }

    /// The whole image
    pub fn full(width: u32, height: u32) -> Self {
        Self::natural(0.0, 0.0, width as f64, height as f64)
    }

    /// Largest region with `aspect_ratio` (width / height) centred in the image,
    /// used when no crop was chosen
    pub fn centered(width: u32, height: u32, aspect_ratio: f64) -> Self {
        let (width, height) = (width as f64, height as f64);
        let (crop_width, crop_height) = if width > height * aspect_ratio {
            (height * aspect_ratio, height)
        } else {
            (width, width / aspect_ratio)
        };

        Self::natural(
            (width - crop_width) / 2.0,
            (height - crop_height) / 2.0,
            crop_width,
            crop_height,
        )
    }
}

/// Tag attached to every pipeline run so late responses can be recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
