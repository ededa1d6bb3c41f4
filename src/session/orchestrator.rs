//! Capture session orchestration
//!
//! Owns the session state and drives both capture flows:
//! - Manual: tap to place a selection, adjust it, then capture. The still is
//!   cropped to the selection and sent through the analysis pipeline.
//! - Auto: a fixed-period timer samples low-quality stills and replaces the
//!   detection overlay with each answer.
//!
//! A mode switch bumps the session epoch, so any capture or sample still in
//! flight from the previous mode is discarded when it completes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::polling::PollingTask;
use super::state::{
    CaptureMode, CaptureSnapshot, CaptureState, SessionState, SharedState, lock_or_recover,
};
use crate::analysis::prompts;
use crate::analysis::{AnalysisPipeline, AnalysisRequest, ObjectDetector};
use crate::capture::{Camera, CapturedImage, ImageCropper, StillOptions};
use crate::config::SnapLabelConfig;
use crate::domain::{
    AnalysisResult, AnalysisStatus, Corner, CropRegion, Detection, DragState, Handle, Point,
    SelectionRect, Vector, Viewport, to_source_pixels,
};
use crate::error::{CaptureError, PollTickError};

/// Tunables for a capture session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub capture_still: StillOptions,
    pub poll_still: StillOptions,
    pub poll_interval: Duration,
    pub crop_max_dimension: Option<u32>,
    /// JPEG quality of auto-mode samples sent to the detector
    pub jpeg_quality: u8,
}

impl SessionSettings {
    pub fn from_config(config: &SnapLabelConfig) -> Self {
        Self {
            capture_still: config.capture_still(),
            poll_still: config.poll_still(),
            poll_interval: config.poll_interval(),
            crop_max_dimension: config.crop_max_dimension,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&SnapLabelConfig::default())
    }
}

/// External collaborators of a session
#[derive(Clone)]
pub struct SessionServices {
    pub camera: Arc<dyn Camera>,
    pub cropper: Arc<dyn ImageCropper>,
    pub detector: Arc<dyn ObjectDetector>,
    pub pipeline: Arc<AnalysisPipeline>,
}

struct Inner {
    state: SharedState,
    services: SessionServices,
    settings: SessionSettings,
}

pub struct CaptureOrchestrator {
    inner: Arc<Inner>,
    polling: Mutex<Option<PollingTask>>,
}

impl CaptureOrchestrator {
    /// New session in manual mode
    pub fn new(
        viewport: Viewport,
        locale: impl Into<String>,
        services: SessionServices,
        settings: SessionSettings,
    ) -> Self {
        let state = SharedState::new(SessionState::new(viewport, locale));
        Self {
            inner: Arc::new(Inner {
                state,
                services,
                settings,
            }),
            polling: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.inner.state.lock().mode
    }

    /// Switch modes. Entering auto mode must happen inside a tokio runtime.
    pub fn set_mode(&self, mode: CaptureMode) {
        let mut polling = lock_or_recover(&self.polling);
        self.switch_mode(&mut polling, mode);
    }

    pub fn toggle_mode(&self) -> CaptureMode {
        let mut polling = lock_or_recover(&self.polling);
        let mode = self.mode().toggled();
        self.switch_mode(&mut polling, mode);
        mode
    }

    fn switch_mode(&self, polling: &mut Option<PollingTask>, mode: CaptureMode) {
        if self.mode() == mode {
            return;
        }
        // The old timer is gone before the new mode is visible
        if let Some(task) = polling.take() {
            task.stop();
        }
        let epoch = {
            let mut state = self.inner.state.lock();
            state.enter_mode(mode);
            state.epoch
        };
        log::info!("Switched to {mode:?} mode");

        if mode == CaptureMode::Auto {
            *polling = Some(self.start_polling(epoch));
        }
    }

    fn start_polling(&self, epoch: u64) -> PollingTask {
        let inner = Arc::clone(&self.inner);
        log::debug!(
            "Polling every {:?} for detections",
            self.inner.settings.poll_interval
        );
        PollingTask::start(self.inner.settings.poll_interval, move || {
            let inner = Arc::clone(&inner);
            async move { inner.sample(epoch).await }
        })
    }

    pub fn is_polling(&self) -> bool {
        lock_or_recover(&self.polling)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop the polling timer; the session stays in its current mode
    pub fn shutdown(&self) {
        if let Some(task) = lock_or_recover(&self.polling).take() {
            task.stop();
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.state.lock().viewport
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.inner.state.lock().set_viewport(viewport);
    }

    /// Place a default-size selection at `point`, clearing any shown result.
    ///
    /// Ignored in auto mode and while a capture is in flight.
    pub fn place_selection(&self, point: Point) -> Option<SelectionRect> {
        self.inner.state.lock().place_selection(point)
    }

    pub fn begin_drag(&self, point: Point) -> DragState {
        self.inner.state.lock().begin_drag(point)
    }

    pub fn drag(&self, delta: Vector) {
        self.inner.state.lock().drag(delta);
    }

    pub fn end_drag(&self) {
        self.inner.state.lock().end_drag();
    }

    pub fn pan_selection(&self, delta: Vector) {
        self.inner
            .state
            .lock()
            .edit_selection(|engine| engine.pan(delta));
    }

    pub fn resize_selection(&self, corner: Corner, delta: Vector) {
        self.inner
            .state
            .lock()
            .edit_selection(|engine| engine.resize_corner(corner, delta));
    }

    /// Selection currently drawn on the overlay
    pub fn selection(&self) -> Option<SelectionRect> {
        self.inner.state.lock().visible_selection()
    }

    pub fn handles(&self) -> Option<[Handle; 4]> {
        self.inner.state.lock().handles()
    }

    pub fn is_capturing(&self) -> bool {
        self.inner.state.lock().capture == CaptureState::Capturing
    }

    pub fn analysis_status(&self) -> AnalysisStatus {
        self.inner.state.lock().analysis.clone()
    }

    pub fn detections(&self) -> Vec<Detection> {
        self.inner.state.lock().detections.clone()
    }

    /// Current detections with their boxes in overlay points
    pub fn detection_overlays(&self) -> Vec<(Detection, SelectionRect)> {
        let state = self.inner.state.lock();
        state
            .detections
            .iter()
            .map(|d| (d.clone(), d.bbox.to_overlay(state.viewport)))
            .collect()
    }

    pub fn locale(&self) -> String {
        self.inner.state.lock().locale.clone()
    }

    /// Switch the analysis locale; unknown tags are rejected
    pub fn set_locale(&self, tag: &str) -> bool {
        if prompts::locale(tag).is_none() {
            log::warn!("Unsupported locale {tag}, keeping the current one");
            return false;
        }
        self.inner.state.lock().locale = tag.to_string();
        true
    }

    /// Capture a still, crop it to the selection and analyze it.
    ///
    /// Returns `Ok(None)` when the request is ignored: a capture is already
    /// running or the session is in auto mode.
    pub async fn capture(&self) -> Result<Option<AnalysisResult>, CaptureError> {
        self.inner.capture().await
    }

    /// Analyze an image chosen from the library, skipping the selection
    pub async fn analyze_image(&self, image: CapturedImage) -> Option<AnalysisResult> {
        self.inner.analyze_image(image).await
    }
}

impl Drop for CaptureOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    async fn capture(&self) -> Result<Option<AnalysisResult>, CaptureError> {
        let (ticket, snapshot) = match self.state.begin_capture() {
            Ok(started) => started,
            Err(reason) => {
                log::debug!("Capture request ignored: {reason:?}");
                return Ok(None);
            }
        };

        let outcome = self.capture_and_analyze(&snapshot).await;
        if let Err(err) = &outcome {
            log::error!("Capture failed: {err}");
        }
        self.state.finish_analysis(snapshot.epoch, &outcome);
        drop(ticket);
        outcome.map(Some)
    }

    async fn capture_and_analyze(
        &self,
        snapshot: &CaptureSnapshot,
    ) -> Result<AnalysisResult, CaptureError> {
        let still = self
            .services
            .camera
            .capture_still(self.settings.capture_still)
            .await?;
        log::debug!("Captured {}x{} still", still.width, still.height);
        let original = still.load().await?;

        let region = source_region(
            snapshot.selection,
            snapshot.viewport,
            original.width(),
            original.height(),
        );
        let cropped = self
            .services
            .cropper
            .crop(&original, region, self.settings.crop_max_dimension)
            .await?;

        let request = AnalysisRequest {
            cropped,
            original: Some(original),
            locale: snapshot.locale.clone(),
        };
        Ok(self.services.pipeline.analyze(request).await)
    }

    async fn analyze_image(&self, image: CapturedImage) -> Option<AnalysisResult> {
        let (ticket, snapshot) = match self.state.begin_capture() {
            Ok(started) => started,
            Err(reason) => {
                log::debug!("Library pick ignored: {reason:?}");
                return None;
            }
        };
        log::info!("Analyzing picked {}x{} image", image.width(), image.height());

        let request = AnalysisRequest {
            cropped: image,
            original: None,
            locale: snapshot.locale.clone(),
        };
        let result = self.services.pipeline.analyze(request).await;
        self.state.finish_analysis(snapshot.epoch, &Ok(result.clone()));
        drop(ticket);
        Some(result)
    }

    /// One auto-mode tick
    async fn sample(&self, epoch: u64) {
        let Some(_ticket) = self.state.begin_sample(epoch) else {
            return;
        };

        let outcome = self.detect_once().await;

        let mut state = self.state.lock();
        if state.epoch != epoch {
            log::debug!("Discarding detections from a finished auto session");
            return;
        }
        match outcome {
            Ok(detections) => {
                log::debug!("Detected {} objects", detections.len());
                state.detections = detections;
            }
            Err(err) => {
                log::warn!("Detection tick failed: {err}");
                state.detections.clear();
            }
        }
    }

    async fn detect_once(&self) -> Result<Vec<Detection>, PollTickError> {
        let still = self
            .services
            .camera
            .capture_still(self.settings.poll_still)
            .await?;
        let image = still.load().await?;
        let encoded = image.encode_base64_jpeg(self.settings.jpeg_quality).await?;
        Ok(self.services.detector.detect(encoded).await?)
    }
}

/// Pixel region of the still to analyze; the whole still when there is no
/// usable selection
pub fn source_region(
    selection: Option<SelectionRect>,
    viewport: Viewport,
    width: u32,
    height: u32,
) -> CropRegion {
    let Some(rect) = selection else {
        return CropRegion::full(width, height);
    };
    let region = to_source_pixels(&rect, viewport, width, height);
    if region.is_empty() {
        log::warn!("Selection maps to an empty region, analyzing the full image");
        return CropRegion::full(width, height);
    }
    region
}
