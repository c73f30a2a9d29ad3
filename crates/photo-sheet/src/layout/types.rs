//! Layout data types for sheet tiling
//!
//! These types represent the intermediate layout calculations between
//! the normalized photo and the rendered page bitmap.

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: u32,
    /// Column index (0 = leftmost column)
    pub col: u32,
}

impl GridPosition {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// A rectangular area in pixels, origin at the top-left of the page
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f64,
    /// Y position (top edge)
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the two rectangles share any area
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Grid computed for one sheet.
///
/// Derived from page size, photo size and requested column count; never stored
/// beyond the sheet it describes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetLayout {
    pub page_width: u32,
    pub page_height: u32,
    pub photo_width: u32,
    pub photo_height: u32,
    pub columns: u32,
    pub rows: u32,
    /// Gap before, between and after photos in a row
    pub horizontal_spacing: f64,
    /// Fixed gap above, between and below rows
    pub vertical_margin: u32,
}

impl SheetLayout {
    /// Number of photos on the sheet
    pub fn total_placed(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    /// Whether the sheet ends up without any photo
    pub fn is_empty(&self) -> bool {
        self.total_placed() == 0
    }
}

/// Where one photo copy lands on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoPlacement {
    pub grid_pos: GridPosition,
    /// Exact position; spacing may be fractional
    pub rect: Rect,
}

impl PhotoPlacement {
    /// Top-left pixel the photo is drawn at
    pub fn pixel_origin(&self) -> (i64, i64) {
        (self.rect.x.round() as i64, self.rect.y.round() as i64)
    }
}
