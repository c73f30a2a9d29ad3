use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cut guide stroke drawn around each photo
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CutGuideStyle {
    pub width_px: u32,
    pub color: Color,
}

impl Default for CutGuideStyle {
    fn default() -> Self {
        Self {
            width_px: CUT_GUIDE_WIDTH_PX,
            color: CUT_GUIDE_COLOR,
        }
    }
}

/// Where and how to reach the background removal service
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MattingOptions {
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Output size requested from the service
    pub size: String,
}

impl Default for MattingOptions {
    fn default() -> Self {
        Self {
            endpoint: REMOVE_BG_ENDPOINT.to_string(),
            api_key_env: REMOVE_BG_API_KEY_ENV.to_string(),
            size: "auto".to_string(),
        }
    }
}

/// Complete sheet configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SheetOptions {
    // Physical output
    pub dpi: u32,
    pub photo_size: PhotoSize,
    pub paper_size: PaperSize,

    // Tiling
    pub vertical_margin_px: u32,
    pub default_columns: u32,
    pub page_background: Color,
    pub cut_guide: CutGuideStyle,

    // Photo
    pub default_background: Color,

    // Download
    pub jpeg_quality: u8,

    pub matting: MattingOptions,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            photo_size: PhotoSize::default(),
            paper_size: PaperSize::default(),
            vertical_margin_px: DEFAULT_VERTICAL_MARGIN_PX,
            default_columns: DEFAULT_COLUMNS,
            page_background: DEFAULT_PAGE_BACKGROUND,
            cut_guide: CutGuideStyle::default(),
            default_background: Color::WHITE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            matting: MattingOptions::default(),
        }
    }
}

impl SheetOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| PhotoError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PhotoError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Target photo size in pixels
    pub fn photo_dimensions_px(&self) -> (u32, u32) {
        self.photo_size.dimensions_px(self.dpi)
    }

    /// Page size in pixels
    pub fn page_dimensions_px(&self) -> (u32, u32) {
        self.paper_size.dimensions_px(self.dpi)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(PhotoError::Config("DPI must be positive".to_string()));
        }

        let (photo_w, photo_h) = self.photo_dimensions_px();
        if photo_w == 0 || photo_h == 0 {
            return Err(PhotoError::Config(format!(
                "Photo size {:?} is empty at {} DPI",
                self.photo_size, self.dpi
            )));
        }

        let (page_w, page_h) = self.page_dimensions_px();
        if page_w == 0 || page_h == 0 {
            return Err(PhotoError::Config(format!(
                "Paper size {:?} is empty at {} DPI",
                self.paper_size, self.dpi
            )));
        }

        if !(1..=MAX_CUT_GUIDE_WIDTH_PX).contains(&self.cut_guide.width_px) {
            return Err(PhotoError::Config(format!(
                "Cut guide width must be between 1 and {} pixels",
                MAX_CUT_GUIDE_WIDTH_PX
            )));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PhotoError::Config(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        if self.default_columns == 0 {
            return Err(PhotoError::Config(
                "Default column count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
