use std::path::PathBuf;

mod worker;

pub use worker::{spawn_worker, worker_task};

// Re-export types from the library crate
pub use photo_sheet::{
    Color, CropRegion, FaceDetector, Generation, MattingService, PipelineState, SheetLayout,
    SheetOptions,
};

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PipelineCommand {
    LoadSource {
        path: PathBuf,
    },
    ApplyCrop {
        region: CropRegion,
    },
    /// Remove the background and tile the sheet
    Process {
        background: Color,
        columns: u32,
    },
    Reset,
    Save {
        output_path: PathBuf,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum PipelineUpdate {
    StateChanged {
        state: PipelineState,
        loading: bool,
        generation: Generation,
    },
    SourceLoaded {
        width: u32,
        height: u32,
    },
    SheetReady {
        generation: Generation,
        layout: SheetLayout,
        width: usize,
        height: usize,
        rgba_data: Vec<u8>,
    },
    Warning {
        message: String,
    },
    Saved {
        path: PathBuf,
        bytes: usize,
    },
    Error {
        message: String,
    },
}
