//! Point a camera at something, select it and find out what it is.
//!
//! A selection drawn over the live preview is mapped onto the captured
//! still, cropped, and sent to label and color services concurrently. An
//! auto mode polls the camera and overlays live object detections instead.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod session;
