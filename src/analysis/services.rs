//! Classification and detection collaborators
//!
//! Every service takes a base64 JPEG and answers with a single value or a
//! [`ClassifyError`]. Transport, retries and timeouts belong to the
//! implementations.

use async_trait::async_trait;

use crate::domain::Detection;
use crate::error::ClassifyError;

/// Names the main object in an image
#[async_trait]
pub trait LabelClassifier: Send + Sync {
    /// `instruction` is the locale-specific prompt bounding the answer length
    async fn classify_label(&self, image: String, instruction: &str)
    -> Result<String, ClassifyError>;
}

/// Names the dominant color of an image
#[async_trait]
pub trait ColorClassifier: Send + Sync {
    async fn classify_color(&self, image: String) -> Result<String, ClassifyError>;
}

/// Finds objects in a live-viewport sample
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    async fn detect(&self, image: String) -> Result<Vec<Detection>, ClassifyError>;
}
