//! Image types passed between the camera, the cropper and the analysis services

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

use crate::error::{CaptureError, ClassifyError};

/// A decoded image, cheap to clone
#[derive(Clone, Debug)]
pub struct CapturedImage {
    rgba: Arc<RgbaImage>,
}

impl CapturedImage {
    pub fn from_rgba(rgba: RgbaImage) -> Self {
        Self {
            rgba: Arc::new(rgba),
        }
    }

    /// Decode any format the `image` crate understands
    pub fn decode(bytes: &[u8]) -> Result<Self, CaptureError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        log::debug!(
            "CapturedImage decoded: {}x{} pixels",
            rgba.width(),
            rgba.height()
        );
        Ok(Self::from_rgba(rgba))
    }

    pub fn rgba(&self) -> &RgbaImage {
        &self.rgba
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Encode as JPEG; alpha is dropped since JPEG has no alpha channel
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>, image::ImageError> {
        let rgb = DynamicImage::ImageRgba8((*self.rgba).clone()).to_rgb8();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)?;
        Ok(buffer)
    }

    /// JPEG bytes as standard base64, the transport encoding for every service
    pub fn to_base64_jpeg(&self, quality: u8) -> Result<String, ClassifyError> {
        let jpeg = self
            .to_jpeg(quality)
            .map_err(|e| ClassifyError::Encode(e.to_string()))?;
        Ok(BASE64_STANDARD.encode(jpeg))
    }

    /// Encode on the blocking pool so large frames do not stall the runtime
    pub async fn encode_base64_jpeg(&self, quality: u8) -> Result<String, ClassifyError> {
        let image = self.clone();
        tokio::task::spawn_blocking(move || image.to_base64_jpeg(quality)).await?
    }

    /// Encode as PNG, lossless
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buffer = Cursor::new(Vec::new());
        self.rgba
            .write_to(&mut buffer, image::ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}

/// Where the camera left a still
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Temporary file owned by the caller
    File(PathBuf),
    /// Encoded bytes held in memory
    Bytes(Vec<u8>),
}

/// A still returned by the camera, before decoding
#[derive(Debug, Clone)]
pub struct StillImage {
    pub source: ImageSource,
    /// True resolution of the still
    pub width: u32,
    pub height: u32,
}

impl StillImage {
    /// Read the encoded bytes and delete any temporary file right away
    pub async fn read_and_discard(self) -> Result<Vec<u8>, CaptureError> {
        match self.source {
            ImageSource::Bytes(bytes) => Ok(bytes),
            ImageSource::File(path) => {
                let read = tokio::fs::read(&path).await;
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    log::warn!("Failed to delete still {}: {}", path.display(), e);
                }
                Ok(read?)
            }
        }
    }

    /// Read, discard and decode the still
    pub async fn load(self) -> Result<CapturedImage, CaptureError> {
        let bytes = self.read_and_discard().await?;
        tokio::task::spawn_blocking(move || CapturedImage::decode(&bytes)).await?
    }
}
