pub mod constants;
mod detect;
pub mod layout;
mod marks;
mod matting;
mod options;
mod photo;
mod pipeline;
mod preview;
pub mod render;
pub mod stages;
mod types;

pub use detect::{FaceDetector, FixedFaceBox, NoFaceDetector, detect_face};
pub use layout::{PhotoPlacement, SheetLayout, compute_sheet_layout};
pub use matting::{MattingService, PassthroughMatting, RemoveBgClient};
pub use options::*;
pub use photo::*;
pub use pipeline::*;
pub use preview::generate_preview;
pub use render::{TileStyle, tile};
pub use types::*;
