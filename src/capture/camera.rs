//! Camera collaborator and a file-backed implementation

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::imageops::FilterType;

use super::image::{CapturedImage, ImageSource, StillImage};
use crate::error::CaptureError;

/// Quality and resolution requested for one still
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StillOptions {
    /// Encoder quality in (0, 1]
    pub quality: f32,
    /// Longest side limit; `None` keeps the sensor resolution
    pub max_dimension: Option<u32>,
}

impl StillOptions {
    /// JPEG quality on the 1-100 scale
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.01, 1.0) * 100.0).round() as u8
    }
}

/// Source of still images from the live viewport
#[async_trait]
pub trait Camera: Send + Sync {
    async fn capture_still(&self, options: StillOptions) -> Result<StillImage, CaptureError>;
}

/// Camera that snapshots the latest frame an external grabber wrote to disk.
///
/// Each still is re-encoded at the requested quality into its own temporary
/// JPEG, which the consumer deletes after reading.
#[derive(Debug, Clone)]
pub struct FileCamera {
    frame_path: PathBuf,
}

impl FileCamera {
    pub fn new(frame_path: impl Into<PathBuf>) -> Self {
        Self {
            frame_path: frame_path.into(),
        }
    }

    pub fn frame_path(&self) -> &Path {
        &self.frame_path
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn capture_still(&self, options: StillOptions) -> Result<StillImage, CaptureError> {
        let frame_path = self.frame_path.clone();
        tokio::task::spawn_blocking(move || snapshot_frame(&frame_path, options)).await?
    }
}

fn snapshot_frame(frame_path: &Path, options: StillOptions) -> Result<StillImage, CaptureError> {
    let frame = match image::open(frame_path) {
        Ok(frame) => frame,
        Err(image::ImageError::IoError(e)) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(CaptureError::PermissionDenied);
        }
        Err(e) => {
            return Err(CaptureError::CaptureFailed(format!(
                "{}: {}",
                frame_path.display(),
                e
            )));
        }
    };

    let frame = match options.max_dimension {
        Some(max) if frame.width().max(frame.height()) > max => {
            frame.resize(max, max, FilterType::Triangle)
        }
        _ => frame,
    };

    let still = CapturedImage::from_rgba(frame.to_rgba8());
    let jpeg = still.to_jpeg(options.jpeg_quality())?;

    let file = tempfile::Builder::new()
        .prefix("snaplabel-still-")
        .suffix(".jpg")
        .tempfile()?;
    std::fs::write(file.path(), &jpeg)?;
    let (_, path) = file
        .keep()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

    log::debug!(
        "Still captured: {}x{} at quality {} -> {}",
        still.width(),
        still.height(),
        options.jpeg_quality(),
        path.display()
    );
    Ok(StillImage {
        source: ImageSource::File(path),
        width: still.width(),
        height: still.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_frame(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("frame.png");
        let frame = CapturedImage::from_rgba(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 200, 10, 255]),
        ));
        std::fs::write(&path, frame.to_png().unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_still_keeps_full_resolution_without_limit() {
        let dir = tempfile::tempdir().unwrap();
        let camera = FileCamera::new(write_frame(dir.path(), 300, 400));
        let still = camera
            .capture_still(StillOptions {
                quality: 1.0,
                max_dimension: None,
            })
            .await
            .unwrap();
        assert_eq!((still.width, still.height), (300, 400));
        let image = still.load().await.unwrap();
        assert_eq!((image.width(), image.height()), (300, 400));
    }

    #[tokio::test]
    async fn test_low_quality_still_is_downscaled() {
        let dir = tempfile::tempdir().unwrap();
        let camera = FileCamera::new(write_frame(dir.path(), 300, 400));
        let still = camera
            .capture_still(StillOptions {
                quality: 0.3,
                max_dimension: Some(100),
            })
            .await
            .unwrap();
        assert_eq!((still.width, still.height), (75, 100));
        let ImageSource::File(path) = still.source.clone() else {
            panic!("expected a temporary file");
        };
        still.read_and_discard().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_frame_is_capture_failure() {
        let camera = FileCamera::new("/nonexistent/snaplabel/frame.png");
        let err = camera
            .capture_still(StillOptions {
                quality: 1.0,
                max_dimension: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::CaptureFailed(_)));
    }
}
