//! Page rendering for photo sheets
//!
//! This module turns a computed layout into pixels:
//! - Filling the page background
//! - Drawing each photo copy at its placement
//! - Stroking cut guides around every copy

mod sheet;

pub use sheet::*;
