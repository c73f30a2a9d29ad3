//! Pipeline orchestration
//!
//! `Pipeline` owns the artifacts of one photo and sequences the stages:
//! 1. `set_crop_region`: extract the crop and align the face
//! 2. `begin_run`: hand the aligned photo to the matting service
//! 3. `complete_run`: composite, normalize and tile the service's answer
//!
//! Every run is tagged with a [`Generation`]. `reset` and a new upload bump it,
//! so a matting response arriving after either is recognised and dropped.

use bytes::Bytes;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

use crate::detect::{FaceDetector, detect_face};
use crate::layout::compute_sheet_layout;
use crate::matting::MattingService;
use crate::options::SheetOptions;
use crate::photo::{FinalSheet, SourceImage};
use crate::render::{TileStyle, tile};
use crate::stages;
use crate::types::*;

/// Where the pipeline currently stands
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    /// Nothing uploaded
    #[default]
    Idle,
    /// Source uploaded, waiting for a crop
    Cropping,
    /// Crop applied and aligned, waiting for processing
    Aligning,
    /// Waiting on the matting service, then flattening its matte
    Compositing,
    Normalizing,
    Tiling,
    /// Sheet rendered and ready for download
    Ready,
    Failed(String),
}

impl PipelineState {
    /// True from the matting call until the sheet is rendered or the run fails
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            PipelineState::Compositing | PipelineState::Normalizing | PipelineState::Tiling
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Ready | PipelineState::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Cropping => write!(f, "cropping"),
            PipelineState::Aligning => write!(f, "aligning"),
            PipelineState::Compositing => write!(f, "compositing"),
            PipelineState::Normalizing => write!(f, "normalizing"),
            PipelineState::Tiling => write!(f, "tiling"),
            PipelineState::Ready => write!(f, "ready"),
            PipelineState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Non-fatal outcome the caller should show
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineWarning {
    /// The layout is valid but not a single row fits on the page
    NoPhotosPlaced { columns: u32, rows: u32 },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::NoPhotosPlaced { columns, rows } => write!(
                f,
                "No photos fit on the page ({columns} columns x {rows} rows)"
            ),
        }
    }
}

/// Snapshot published on every state change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub loading: bool,
    pub generation: Generation,
    pub warnings: Vec<PipelineWarning>,
}

/// Payload for the matting service, tagged with the run it belongs to
#[derive(Debug, Clone)]
pub struct MattingRequest {
    pub generation: Generation,
    pub image: Bytes,
}

/// Parameters of the run waiting on the matting service
#[derive(Debug, Clone, Copy)]
struct PendingRun {
    generation: Generation,
    background: Color,
    columns: u32,
}

pub struct Pipeline {
    options: SheetOptions,
    style: TileStyle,
    state: PipelineState,
    generation: Generation,
    source: Option<SourceImage>,
    /// Aligned photo, PNG encoded; kept so processing can be re-triggered
    aligned: Option<Bytes>,
    pending: Option<PendingRun>,
    sheet: Option<Arc<FinalSheet>>,
    warnings: Vec<PipelineWarning>,
    status_tx: watch::Sender<PipelineStatus>,
}

impl Pipeline {
    pub fn new(options: SheetOptions) -> Result<Self> {
        options.validate()?;
        let (status_tx, _) = watch::channel(PipelineStatus::default());

        Ok(Self {
            style: TileStyle::from(&options),
            options,
            state: PipelineState::Idle,
            generation: Generation::default(),
            source: None,
            aligned: None,
            pending: None,
            sheet: None,
            warnings: Vec::new(),
            status_tx,
        })
    }

    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// The aligned photo as sent to the matting service
    pub fn aligned_png(&self) -> Option<&Bytes> {
        self.aligned.as_ref()
    }

    pub fn sheet(&self) -> Option<Arc<FinalSheet>> {
        self.sheet.clone()
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            state: self.state.clone(),
            loading: self.state.is_loading(),
            generation: self.generation,
            warnings: self.warnings.clone(),
        }
    }

    /// Receive a fresh [`PipelineStatus`] on every transition
    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.status_tx.subscribe()
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Take a newly uploaded photo, superseding everything derived from the previous one
    pub fn load_source(&mut self, source: SourceImage) {
        log::info!(
            "Loaded {}x{} source image",
            source.width(),
            source.height()
        );
        self.discard();
        self.source = Some(source);
        self.transition(PipelineState::Cropping);
    }

    /// Apply the user's crop and re-centre the face.
    ///
    /// Detector failures are absorbed; the photo is then used as cropped.
    pub fn set_crop_region(
        &mut self,
        region: CropRegion,
        detector: &dyn FaceDetector,
    ) -> Result<()> {
        if self.pending.is_some() {
            return Err(PhotoError::Busy);
        }
        let Some(source) = self.source.clone() else {
            return Err(PhotoError::InvalidState("no image uploaded".to_string()));
        };

        self.aligned = None;
        self.sheet = None;
        self.warnings.clear();
        self.transition(PipelineState::Cropping);

        let cropped = match stages::extract(&source, &region) {
            Ok(cropped) => cropped,
            Err(e) => return Err(self.fail(e)),
        };

        self.transition(PipelineState::Aligning);
        let face = detect_face(detector, cropped.image());
        let aligned = stages::align(cropped, face.as_ref());

        match aligned.to_png() {
            Ok(png) => {
                self.aligned = Some(png);
                self.publish();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Start processing: validate the layout and hand out the matting request.
    ///
    /// # Errors
    /// `Busy` while another run waits on the matting service,
    /// `LayoutInfeasible` before anything is sent when `columns` cannot fit.
    pub fn begin_run(&mut self, background: Color, columns: u32) -> Result<MattingRequest> {
        if self.pending.is_some() {
            return Err(PhotoError::Busy);
        }
        let Some(image) = self.aligned.clone() else {
            return Err(PhotoError::InvalidState(
                "no cropped photo to process".to_string(),
            ));
        };

        if let Err(e) = compute_sheet_layout(
            self.options.page_dimensions_px(),
            self.options.photo_dimensions_px(),
            columns,
            self.options.vertical_margin_px,
        ) {
            return Err(self.fail(e));
        }

        self.generation = self.generation.next();
        self.pending = Some(PendingRun {
            generation: self.generation,
            background,
            columns,
        });
        self.sheet = None;
        self.warnings.clear();
        log::info!(
            "Starting run {} (background {}, {} columns)",
            self.generation,
            background,
            columns
        );
        self.transition(PipelineState::Compositing);

        Ok(MattingRequest {
            generation: self.generation,
            image,
        })
    }

    /// Finish a run with the matting service's answer.
    ///
    /// Returns `Ok(None)` when `generation` is not the pending run; the
    /// response is then dropped without touching any state.
    pub fn complete_run(
        &mut self,
        generation: Generation,
        response: Result<Bytes>,
    ) -> Result<Option<Arc<FinalSheet>>> {
        let run = match self.pending {
            Some(run) if run.generation == generation => run,
            _ => {
                log::info!("Discarding stale matting response for run {generation}");
                return Ok(None);
            }
        };

        match self.finish(run, response) {
            Ok(sheet) => {
                self.pending = None;
                if sheet.layout.is_empty() {
                    self.warnings.push(PipelineWarning::NoPhotosPlaced {
                        columns: sheet.layout.columns,
                        rows: sheet.layout.rows,
                    });
                }
                self.sheet = Some(Arc::clone(&sheet));
                self.transition(PipelineState::Ready);
                Ok(Some(sheet))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Run the whole processing step against `matting`
    pub async fn run_pipeline(
        &mut self,
        background: Color,
        columns: u32,
        matting: &dyn MattingService,
    ) -> Result<Arc<FinalSheet>> {
        let request = self.begin_run(background, columns)?;
        let response = matting.remove_background(request.image).await;

        self.complete_run(request.generation, response)?
            .ok_or_else(|| PhotoError::InvalidState("run was superseded".to_string()))
    }

    /// Start over: drop every artifact and return to `Idle`
    pub fn reset(&mut self) {
        log::info!("Pipeline reset");
        self.discard();
        self.source = None;
        self.transition(PipelineState::Idle);
    }

    /// The rendered sheet as JPEG
    pub fn download(&self) -> Result<Vec<u8>> {
        self.ready_sheet()?.to_jpeg(self.options.jpeg_quality)
    }

    /// Encode the rendered sheet off the async thread and write it to `path`
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        let sheet = self.ready_sheet()?;
        let quality = self.options.jpeg_quality;

        let bytes = tokio::task::spawn_blocking(move || sheet.to_jpeg(quality)).await??;
        tokio::fs::write(path, &bytes).await?;
        Ok(bytes.len())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn finish(&mut self, run: PendingRun, response: Result<Bytes>) -> Result<Arc<FinalSheet>> {
        let matted = response?;
        let composed = stages::compose(&matted, run.background)?;
        drop(matted);

        self.transition(PipelineState::Normalizing);
        let (width, height) = self.options.photo_dimensions_px();
        let normalized = stages::normalize(composed, width, height)?;

        self.transition(PipelineState::Tiling);
        let (page_width, page_height) = self.options.page_dimensions_px();
        let sheet = tile(&normalized, page_width, page_height, run.columns, &self.style)?;

        Ok(Arc::new(sheet))
    }

    fn ready_sheet(&self) -> Result<Arc<FinalSheet>> {
        match (&self.state, &self.sheet) {
            (PipelineState::Ready, Some(sheet)) => Ok(Arc::clone(sheet)),
            _ => Err(PhotoError::InvalidState(format!(
                "no sheet to download (pipeline is {})",
                self.state
            ))),
        }
    }

    /// Invalidate the pending run and drop derived artifacts
    fn discard(&mut self) {
        self.generation = self.generation.next();
        self.pending = None;
        self.aligned = None;
        self.sheet = None;
        self.warnings.clear();
    }

    fn fail(&mut self, error: PhotoError) -> PhotoError {
        log::error!("Pipeline run {} failed: {}", self.generation, error);
        self.pending = None;
        self.transition(PipelineState::Failed(error.to_string()));
        error
    }

    fn transition(&mut self, state: PipelineState) {
        log::debug!("Pipeline {} -> {}", self.state, state);
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.status());
    }
}
