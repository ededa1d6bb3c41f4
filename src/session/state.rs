use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{
    AnalysisResult, AnalysisStatus, Detection, DragState, Handle, Point, SelectionEngine,
    SelectionRect, Vector, Viewport,
};
use crate::error::CaptureError;

/// How the session reacts to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Tap to select, then capture on demand
    #[default]
    Manual,
    /// Poll the camera and overlay live detections
    Auto,
}

impl CaptureMode {
    pub fn toggled(self) -> Self {
        match self {
            CaptureMode::Manual => CaptureMode::Auto,
            CaptureMode::Auto => CaptureMode::Manual,
        }
    }
}

/// Single-flight guard for manual captures and library picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
}

/// Overlap guard for auto-mode samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Sampling,
}

/// Why a capture request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRejected {
    /// Another capture is still in progress
    Busy,
    /// Manual capture and library pick are disabled in auto mode
    AutoMode,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub mode: CaptureMode,
    pub capture: CaptureState,
    pub poll: PollState,
    /// Bumped on every mode transition; results from older epochs are dropped
    pub epoch: u64,
    pub viewport: Viewport,
    pub selection: Option<SelectionEngine>,
    pub overlay_visible: bool,
    pub detections: Vec<Detection>,
    pub analysis: AnalysisStatus,
    pub locale: String,
}

impl SessionState {
    pub fn new(viewport: Viewport, locale: impl Into<String>) -> Self {
        Self {
            viewport,
            locale: locale.into(),
            ..Self::default()
        }
    }

    /// Switch modes, dropping everything that belonged to the previous one
    pub fn enter_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
        self.epoch = self.epoch.wrapping_add(1);
        self.selection = None;
        self.overlay_visible = false;
        self.detections.clear();
        self.poll = PollState::Idle;
        self.analysis = AnalysisStatus::Idle;
    }

    /// Start a new selection; a stale result is cleared
    pub fn place_selection(&mut self, point: Point) -> Option<SelectionRect> {
        if self.mode == CaptureMode::Auto || self.capture == CaptureState::Capturing {
            return None;
        }
        let engine = SelectionEngine::placed_at(self.viewport, point);
        let rect = engine.rect();
        self.selection = Some(engine);
        self.overlay_visible = true;
        self.analysis = AnalysisStatus::Idle;
        Some(rect)
    }

    /// Selection that gestures may currently edit
    fn editable_selection(&mut self) -> Option<&mut SelectionEngine> {
        if self.mode == CaptureMode::Auto
            || self.capture == CaptureState::Capturing
            || !self.overlay_visible
        {
            return None;
        }
        self.selection.as_mut()
    }

    pub fn begin_drag(&mut self, point: Point) -> DragState {
        self.editable_selection()
            .map(|engine| engine.begin_drag(point))
            .unwrap_or_default()
    }

    pub fn drag(&mut self, delta: Vector) {
        if let Some(engine) = self.editable_selection() {
            engine.drag(delta);
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(engine) = self.selection.as_mut() {
            engine.end_drag();
        }
    }

    pub fn edit_selection(&mut self, edit: impl FnOnce(&mut SelectionEngine)) {
        if let Some(engine) = self.editable_selection() {
            edit(engine);
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(engine) = self.selection.as_mut() {
            engine.set_viewport(viewport);
        }
    }

    /// Rectangle shown on the overlay, if any
    pub fn visible_selection(&self) -> Option<SelectionRect> {
        self.selection
            .as_ref()
            .filter(|_| self.overlay_visible)
            .map(SelectionEngine::rect)
    }

    pub fn handles(&self) -> Option<[Handle; 4]> {
        self.selection
            .as_ref()
            .filter(|_| self.overlay_visible)
            .map(SelectionEngine::handles)
    }
}

/// What a capture needs to know about the session when it starts
#[derive(Debug, Clone)]
pub struct CaptureSnapshot {
    pub epoch: u64,
    pub selection: Option<SelectionRect>,
    pub viewport: Viewport,
    pub locale: String,
}

/// Session state shared between the orchestrator and its polling task
#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<SessionState>>);

impl SharedState {
    pub fn new(state: SessionState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Lock the state; never held across an await
    pub fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_or_recover(&self.0)
    }

    /// Take the capture guard and hide the overlay
    pub fn begin_capture(&self) -> Result<(CaptureTicket, CaptureSnapshot), CaptureRejected> {
        let mut state = self.lock();
        if state.mode == CaptureMode::Auto {
            return Err(CaptureRejected::AutoMode);
        }
        if state.capture == CaptureState::Capturing {
            return Err(CaptureRejected::Busy);
        }
        state.capture = CaptureState::Capturing;
        state.overlay_visible = false;
        state.analysis = AnalysisStatus::Loading;

        let snapshot = CaptureSnapshot {
            epoch: state.epoch,
            selection: state.selection.as_ref().map(SelectionEngine::rect),
            viewport: state.viewport,
            locale: state.locale.clone(),
        };
        let ticket = CaptureTicket {
            state: self.clone(),
            epoch: state.epoch,
        };
        Ok((ticket, snapshot))
    }

    /// Record how a capture ended, unless the mode changed in the meantime
    pub fn finish_analysis(&self, epoch: u64, outcome: &Result<AnalysisResult, CaptureError>) {
        let mut state = self.lock();
        if state.epoch != epoch {
            log::debug!("Dropping analysis from a previous mode");
            return;
        }
        state.analysis = match outcome {
            Ok(result) => AnalysisStatus::Done(result.clone()),
            Err(err) => AnalysisStatus::Error(err.to_string()),
        };
    }

    /// Mark a sample in flight, unless one already is or the session moved on
    pub fn begin_sample(&self, epoch: u64) -> Option<SampleTicket> {
        let mut state = self.lock();
        if state.mode != CaptureMode::Auto || state.epoch != epoch {
            log::debug!("Poll tick after auto mode ended, ignoring");
            return None;
        }
        if state.poll == PollState::Sampling {
            log::debug!("Previous sample still in flight, skipping tick");
            return None;
        }
        state.poll = PollState::Sampling;
        Some(SampleTicket {
            state: self.clone(),
            epoch,
        })
    }
}

/// Holds the capture guard; dropping it releases the guard on every path
#[derive(Debug)]
pub struct CaptureTicket {
    state: SharedState,
    epoch: u64,
}

impl Drop for CaptureTicket {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.capture = CaptureState::Idle;
        if state.epoch != self.epoch {
            return;
        }
        // Cancelled before a result was recorded
        if state.analysis == AnalysisStatus::Loading {
            state.analysis = AnalysisStatus::Idle;
        }
        if state.selection.is_some() {
            state.overlay_visible = true;
        }
    }
}

/// Holds the in-flight flag of one auto-mode sample
#[derive(Debug)]
pub struct SampleTicket {
    state: SharedState,
    epoch: u64,
}

impl Drop for SampleTicket {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        // A mode switch already reset the flag
        if state.epoch == self.epoch {
            state.poll = PollState::Idle;
        }
    }
}

pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> SharedState {
        SharedState::new(SessionState::new(Viewport::new(390.0, 844.0), "en-US"))
    }

    #[test]
    fn test_capture_guard_is_single_flight() {
        let state = manual();
        let (ticket, _) = state.begin_capture().unwrap();
        assert_eq!(state.begin_capture().unwrap_err(), CaptureRejected::Busy);
        drop(ticket);
        assert!(state.begin_capture().is_ok());
    }

    #[test]
    fn test_capture_hides_overlay_until_released() {
        let state = manual();
        state.lock().place_selection(Point::new(195.0, 422.0));
        let (ticket, snapshot) = state.begin_capture().unwrap();
        assert_eq!(snapshot.selection, Some(SelectionRect::new(125.0, 352.0, 140.0, 140.0)));
        assert!(state.lock().visible_selection().is_none());
        assert!(state.lock().place_selection(Point::new(10.0, 10.0)).is_none());
        drop(ticket);
        assert!(state.lock().visible_selection().is_some());
    }

    #[test]
    fn test_auto_mode_rejects_capture_and_selection() {
        let state = manual();
        state.lock().place_selection(Point::new(195.0, 422.0));
        state.lock().enter_mode(CaptureMode::Auto);
        assert!(state.lock().selection.is_none());
        assert_eq!(state.begin_capture().unwrap_err(), CaptureRejected::AutoMode);
        assert!(state.lock().place_selection(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_sample_ticket_from_old_epoch_does_not_clear_new_flag() {
        let state = manual();
        state.lock().enter_mode(CaptureMode::Auto);
        let epoch = state.lock().epoch;
        let old = state.begin_sample(epoch).unwrap();
        assert!(state.begin_sample(epoch).is_none());

        state.lock().enter_mode(CaptureMode::Manual);
        state.lock().enter_mode(CaptureMode::Auto);
        let fresh_epoch = state.lock().epoch;
        let fresh = state.begin_sample(fresh_epoch).unwrap();
        drop(old);
        assert_eq!(state.lock().poll, PollState::Sampling);
        drop(fresh);
        assert_eq!(state.lock().poll, PollState::Idle);
    }

    #[test]
    fn test_gestures_route_through_drag_state() {
        let state = manual();
        let mut session = state.lock();
        session.place_selection(Point::new(195.0, 422.0));
        assert_eq!(session.begin_drag(Point::new(195.0, 422.0)), DragState::Pan);
        session.drag(Vector::new(-500.0, 0.0));
        session.end_drag();
        assert_eq!(session.visible_selection().unwrap().x, 0.0);
    }
}
