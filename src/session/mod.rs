//! Capture session management
//!
//! This module contains:
//! - Session state, mode and in-flight guards (state.rs)
//! - The auto-mode polling timer (polling.rs)
//! - The orchestrator driving manual capture and live detection (orchestrator.rs)

pub mod orchestrator;
pub mod polling;
pub mod state;

pub use orchestrator::{CaptureOrchestrator, SessionServices, SessionSettings, source_region};
pub use polling::PollingTask;
pub use state::{CaptureMode, CaptureRejected, CaptureState, PollState, SessionState};
