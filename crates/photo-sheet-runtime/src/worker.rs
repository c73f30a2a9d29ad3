use bytes::Bytes;
use photo_sheet::constants::PREVIEW_MAX_DIMENSION;
use photo_sheet::{
    FaceDetector, FinalSheet, Generation, MattingRequest, MattingService, PhotoError, Pipeline,
    PipelineStatus, SourceImage, generate_preview,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::{PipelineCommand, PipelineUpdate};

type MatteResponse = (Generation, photo_sheet::Result<Bytes>);

/// Start [`worker_task`] on the current runtime
pub fn spawn_worker(
    pipeline: Pipeline,
    detector: Arc<dyn FaceDetector>,
    matting: Arc<dyn MattingService>,
) -> (
    mpsc::UnboundedSender<PipelineCommand>,
    mpsc::UnboundedReceiver<PipelineUpdate>,
    JoinHandle<()>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(worker_task(
        pipeline, detector, matting, command_rx, update_tx,
    ));
    (command_tx, update_rx, handle)
}

/// Async worker task that drives the pipeline and sends updates.
///
/// Matting calls run as separate tasks so commands such as `Reset` are handled
/// while a call is in flight. Their responses come back through the pipeline's
/// generation check, so a superseded run never reaches the UI.
pub async fn worker_task(
    pipeline: Pipeline,
    detector: Arc<dyn FaceDetector>,
    matting: Arc<dyn MattingService>,
    mut command_rx: mpsc::UnboundedReceiver<PipelineCommand>,
    update_tx: mpsc::UnboundedSender<PipelineUpdate>,
) {
    let mut worker = Worker {
        status_rx: pipeline.subscribe(),
        pipeline,
        detector,
        matting,
        in_flight: JoinSet::new(),
        update_tx,
    };

    loop {
        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(cmd) => worker.process_command(cmd).await,
                None => break,
            },
            Some(joined) = worker.in_flight.join_next() => match joined {
                Ok((generation, response)) => worker.handle_matte(generation, response).await,
                Err(e) => worker.send_error(format!("Matting task failed: {}", e)),
            },
        }

        worker.forward_status();
    }

    log::debug!("Command channel closed, worker exiting");
}

struct Worker {
    pipeline: Pipeline,
    status_rx: watch::Receiver<PipelineStatus>,
    detector: Arc<dyn FaceDetector>,
    matting: Arc<dyn MattingService>,
    in_flight: JoinSet<MatteResponse>,
    update_tx: mpsc::UnboundedSender<PipelineUpdate>,
}

impl Worker {
    async fn process_command(&mut self, cmd: PipelineCommand) {
        match cmd {
            PipelineCommand::LoadSource { path } => self.handle_load(path).await,
            PipelineCommand::ApplyCrop { region } => {
                if let Err(e) = self
                    .pipeline
                    .set_crop_region(region, self.detector.as_ref())
                {
                    self.send_error(format!("Failed to apply crop: {}", e));
                }
            }
            PipelineCommand::Process {
                background,
                columns,
            } => self.handle_process(background, columns),
            PipelineCommand::Reset => self.pipeline.reset(),
            PipelineCommand::Save { output_path } => self.handle_save(output_path).await,
        }
    }

    async fn handle_load(&mut self, path: PathBuf) {
        match SourceImage::load(&path).await {
            Ok(source) => {
                let (width, height) = (source.width(), source.height());
                self.pipeline.load_source(source);
                self.send(PipelineUpdate::SourceLoaded { width, height });
            }
            Err(e) => {
                self.send_error(format!("Failed to load {}: {}", path.display(), e));
            }
        }
    }

    fn handle_process(&mut self, background: photo_sheet::Color, columns: u32) {
        let request = match self.pipeline.begin_run(background, columns) {
            Ok(request) => request,
            Err(e) => {
                self.send_error(format!("Failed to start processing: {}", e));
                return;
            }
        };

        let matting = Arc::clone(&self.matting);
        let MattingRequest { generation, image } = request;
        self.in_flight.spawn(async move {
            // A panicking service must still end the run it belongs to
            let call = tokio::spawn(async move { matting.remove_background(image).await });
            let response = match call.await {
                Ok(response) => response,
                Err(e) => Err(PhotoError::MatteServiceFailure(format!(
                    "matting task failed: {}",
                    e
                ))),
            };
            (generation, response)
        });
    }

    async fn handle_matte(&mut self, generation: Generation, response: photo_sheet::Result<Bytes>) {
        let sheet = match self.pipeline.complete_run(generation, response) {
            Ok(Some(sheet)) => sheet,
            Ok(None) => return,
            Err(e) => {
                self.send_error(e.to_string());
                return;
            }
        };

        self.forward_status();
        for warning in self.pipeline.warnings() {
            self.send(PipelineUpdate::Warning {
                message: warning.to_string(),
            });
        }

        match render_preview(Arc::clone(&sheet)).await {
            Ok((width, height, rgba_data)) => self.send(PipelineUpdate::SheetReady {
                generation,
                layout: sheet.layout,
                width,
                height,
                rgba_data,
            }),
            Err(e) => self.send_error(format!("Failed to render preview: {}", e)),
        }
    }

    async fn handle_save(&mut self, output_path: PathBuf) {
        match self.pipeline.save(&output_path).await {
            Ok(bytes) => {
                log::info!("Saved sheet to {} ({} bytes)", output_path.display(), bytes);
                self.send(PipelineUpdate::Saved {
                    path: output_path,
                    bytes,
                });
            }
            Err(e) => self.send_error(format!("Failed to save sheet: {}", e)),
        }
    }

    /// Send the latest pipeline status if it changed since the last one sent
    fn forward_status(&mut self) {
        if !self.status_rx.has_changed().unwrap_or(false) {
            return;
        }
        let status = self.status_rx.borrow_and_update().clone();
        self.send(PipelineUpdate::StateChanged {
            state: status.state,
            loading: status.loading,
            generation: status.generation,
        });
    }

    fn send(&self, update: PipelineUpdate) {
        let _ = self.update_tx.send(update);
    }

    fn send_error(&self, message: String) {
        log::error!("{}", message);
        self.send(PipelineUpdate::Error { message });
    }
}

async fn render_preview(
    sheet: Arc<FinalSheet>,
) -> Result<(usize, usize, Vec<u8>), tokio::task::JoinError> {
    tokio::task::spawn_blocking(move || {
        let preview = generate_preview(&sheet, PREVIEW_MAX_DIMENSION);
        let (width, height) = preview.dimensions();
        (width as usize, height as usize, preview.into_raw())
    })
    .await
}
