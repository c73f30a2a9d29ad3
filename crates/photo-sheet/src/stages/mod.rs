//! The image stages of the pipeline
//!
//! Each stage is a pure transform from one artifact to the next:
//! 1. Extract the crop region from the source image
//! 2. Re-centre the face vertically
//! 3. Flatten the background-removed matte onto a solid colour
//! 4. Normalize to the exact photo size
//!
//! Tiling onto the page lives in [`crate::render`].

mod align;
mod crop;
mod matte;
mod normalize;

pub use align::align;
pub use crop::extract;
pub use matte::compose;
pub use normalize::normalize;
