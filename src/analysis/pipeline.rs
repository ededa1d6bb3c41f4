//! Label and color analysis of a captured image
//!
//! The label and color calls are independent: each one runs to completion,
//! a failure degrades only its own field, and the result is reported once
//! both have settled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::color_names::ColorLocalizer;
use super::prompts::instruction_for;
use super::services::{ColorClassifier, LabelClassifier};
use crate::capture::CapturedImage;
use crate::domain::{
    AnalysisResult, COLOR_UNAVAILABLE, FieldStatus, LABEL_NO_CREDENTIAL, LABEL_UNAVAILABLE,
};
use crate::error::ClassifyError;

/// Which image the label classifier sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelContext {
    /// The uncropped still, when one is available
    #[default]
    FullFrame,
    /// Only the selected region
    Selection,
}

/// Images and locale for one analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// The selected region, or the whole picked image
    pub cropped: CapturedImage,
    /// The uncropped still for services that prefer full context
    pub original: Option<CapturedImage>,
    pub locale: String,
}

pub struct AnalysisPipeline {
    label: Arc<dyn LabelClassifier>,
    color: Arc<dyn ColorClassifier>,
    localizer: Arc<dyn ColorLocalizer>,
    label_context: LabelContext,
    jpeg_quality: u8,
}

impl AnalysisPipeline {
    pub fn new(
        label: Arc<dyn LabelClassifier>,
        color: Arc<dyn ColorClassifier>,
        localizer: Arc<dyn ColorLocalizer>,
    ) -> Self {
        Self {
            label,
            color,
            localizer,
            label_context: LabelContext::default(),
            jpeg_quality: 85,
        }
    }

    pub fn with_label_context(mut self, label_context: LabelContext) -> Self {
        self.label_context = label_context;
        self
    }

    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }

    /// Run both classifications and merge them into one result
    pub async fn analyze(&self, request: AnalysisRequest) -> AnalysisResult {
        let label_image = match (self.label_context, &request.original) {
            (LabelContext::FullFrame, Some(original)) => original,
            _ => &request.cropped,
        };

        let (label, color) = futures::join!(
            self.classify_label(label_image, &request.locale),
            self.classify_color(&request.cropped),
        );

        let (object_label, label_status) = match label {
            Ok(label) => (label, FieldStatus::Identified),
            Err(ClassifyError::MissingCredential(var)) => {
                log::error!("Label classification skipped: {var} is not set");
                (LABEL_NO_CREDENTIAL.to_string(), FieldStatus::Unavailable)
            }
            Err(err) => {
                log::warn!("Label classification failed: {err}");
                (LABEL_UNAVAILABLE.to_string(), FieldStatus::Unavailable)
            }
        };

        let (color_name, translated_color_name, color_status) = match color {
            Ok(color) => {
                let translated = self.localizer.localize(&color, &request.locale);
                (color, Some(translated), FieldStatus::Identified)
            }
            Err(err) => {
                log::warn!("Color classification failed: {err}");
                (COLOR_UNAVAILABLE.to_string(), None, FieldStatus::Unavailable)
            }
        };

        let result = AnalysisResult {
            object_label,
            color_name,
            translated_color_name,
            label_status,
            color_status,
        };
        log::info!(
            "Analysis finished ({:?}): '{}' / '{}'",
            result.outcome(),
            result.object_label,
            result.display_color()
        );
        result
    }

    async fn classify_label(
        &self,
        image: &CapturedImage,
        locale: &str,
    ) -> Result<String, ClassifyError> {
        let encoded = image.encode_base64_jpeg(self.jpeg_quality).await?;
        self.label
            .classify_label(encoded, instruction_for(locale))
            .await
    }

    async fn classify_color(&self, image: &CapturedImage) -> Result<String, ClassifyError> {
        let encoded = image.encode_base64_jpeg(self.jpeg_quality).await?;
        self.color.classify_color(encoded).await
    }
}
