//! Layout calculation modules for sheet generation
//!
//! This module handles all the geometric calculations:
//! - Grid layout (spacing, row count, photo positions on the page)
//! - Content placement (aspect-preserving fit of a photo into its frame)

mod grid;
mod placement;
mod types;

pub use grid::*;
pub use placement::*;
pub use types::*;
