//! Image acquisition and preparation
//!
//! This module consolidates:
//! - The camera collaborator (camera.rs)
//! - The crop/resize collaborator (crop.rs)
//! - Still and decoded image types (image.rs)

pub mod camera;
pub mod crop;
pub mod image;

pub use self::camera::{Camera, FileCamera, StillOptions};
pub use self::crop::{ImageCropper, ImageOpsCropper};
pub use self::image::{CapturedImage, ImageSource, StillImage};
