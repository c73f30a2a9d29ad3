//! Grid layout calculation
//!
//! This module handles the geometric layout of photo copies on a page:
//! horizontal spacing, row count and the position of every copy.

use crate::types::{PhotoError, Result};

use super::{GridPosition, PhotoPlacement, Rect, SheetLayout};

// =============================================================================
// Grid Creation
// =============================================================================

/// Compute the grid for tiling `columns` photos per row onto a page.
///
/// The free width is split into `columns + 1` equal gaps so the row is
/// centred whatever the column count. Rows are separated by the fixed
/// `vertical_margin`, which is never stretched to fill the page.
///
/// # Arguments
/// * `page` - Page (width, height) in pixels
/// * `photo` - Photo (width, height) in pixels
/// * `columns` - Requested photos per row
/// * `vertical_margin` - Gap above, between and below rows in pixels
///
/// # Errors
/// `LayoutInfeasible` when the row of photos is wider than the page, or when
/// there is no column or the photo has no width.
pub fn compute_sheet_layout(
    page: (u32, u32),
    photo: (u32, u32),
    columns: u32,
    vertical_margin: u32,
) -> Result<SheetLayout> {
    let (page_width, page_height) = page;
    let (photo_width, photo_height) = photo;

    let infeasible = || PhotoError::LayoutInfeasible {
        columns,
        photo_width,
        page_width,
    };

    if columns == 0 || photo_width == 0 {
        return Err(infeasible());
    }

    let row_width = columns as u64 * photo_width as u64;
    if row_width > page_width as u64 {
        return Err(infeasible());
    }

    let horizontal_spacing = (page_width as u64 - row_width) as f64 / (columns as u64 + 1) as f64;

    // A row is only started when its bottom edge stays above the bottom margin
    let usable_height = page_height.saturating_sub(vertical_margin) as u64;
    let row_pitch = photo_height as u64 + vertical_margin as u64;
    let rows = if row_pitch == 0 {
        0
    } else {
        (usable_height / row_pitch) as u32
    };

    let layout = SheetLayout {
        page_width,
        page_height,
        photo_width,
        photo_height,
        columns,
        rows,
        horizontal_spacing,
        vertical_margin,
    };

    log::debug!(
        "Sheet layout: {}x{} grid, spacing {:.2}px, {} photos",
        columns,
        rows,
        horizontal_spacing,
        layout.total_placed()
    );

    Ok(layout)
}

// =============================================================================
// Placement
// =============================================================================

/// Position of every photo copy, row by row, left to right.
pub fn photo_placements(layout: &SheetLayout) -> Vec<PhotoPlacement> {
    let mut placements = Vec::with_capacity(layout.total_placed() as usize);

    let photo_width = layout.photo_width as f64;
    let photo_height = layout.photo_height as f64;
    let margin = layout.vertical_margin as f64;

    let mut y = margin;
    for row in 0..layout.rows {
        let mut x = layout.horizontal_spacing;
        for col in 0..layout.columns {
            placements.push(PhotoPlacement {
                grid_pos: GridPosition::new(row, col),
                rect: Rect::new(x, y, photo_width, photo_height),
            });
            x += photo_width + layout.horizontal_spacing;
        }
        y += photo_height + margin;
    }

    placements
}

// =============================================================================
// Tests
// =============================================================================
