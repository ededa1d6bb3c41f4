//! Results produced by classification and detection

use serde::{Deserialize, Serialize};

use super::geometry::NormalizedBox;

/// Label shown when the object could not be identified
pub const LABEL_UNAVAILABLE: &str = "Unable to identify";
/// Label shown when the label service has no credential configured
pub const LABEL_NO_CREDENTIAL: &str = "API key not configured";
/// Color shown when the color could not be identified
pub const COLOR_UNAVAILABLE: &str = "Unable to identify color";

/// One object found by the live detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    /// Bounding box normalized to the sampled frame
    #[serde(with = "bbox_serde")]
    pub bbox: NormalizedBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: NormalizedBox) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

/// Whether one half of the analysis produced a real value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Identified,
    Unavailable,
}

/// Overall quality of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Both label and color were identified
    Success,
    /// Exactly one of label and color was identified
    Partial,
    Failed,
}

/// Consolidated label and color for one captured image
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub object_label: String,
    pub color_name: String,
    /// Color name in the active locale, present only when the color was identified
    pub translated_color_name: Option<String>,
    pub label_status: FieldStatus,
    pub color_status: FieldStatus,
}

impl AnalysisResult {
    pub fn outcome(&self) -> AnalysisOutcome {
        match (self.label_status, self.color_status) {
            (FieldStatus::Identified, FieldStatus::Identified) => AnalysisOutcome::Success,
            (FieldStatus::Unavailable, FieldStatus::Unavailable) => AnalysisOutcome::Failed,
            _ => AnalysisOutcome::Partial,
        }
    }

    /// Color name to display, preferring the localized form
    pub fn display_color(&self) -> &str {
        self.translated_color_name
            .as_deref()
            .unwrap_or(&self.color_name)
    }
}

/// Progress of the analysis shown to the user
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisStatus {
    #[default]
    Idle,
    Loading,
    Done(AnalysisResult),
    Error(String),
}

mod bbox_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::domain::geometry::NormalizedBox;

    #[derive(Serialize, Deserialize)]
    struct WireBox {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    }

    pub fn serialize<S: Serializer>(
        bbox: &NormalizedBox,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        WireBox {
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NormalizedBox, D::Error> {
        let wire = WireBox::deserialize(deserializer)?;
        Ok(NormalizedBox::clamped(wire.x, wire.y, wire.width, wire.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: FieldStatus, color: FieldStatus) -> AnalysisResult {
        AnalysisResult {
            object_label: "mug".to_string(),
            color_name: "red".to_string(),
            translated_color_name: None,
            label_status: label,
            color_status: color,
        }
    }

    #[test]
    fn test_outcome_reflects_both_fields() {
        use FieldStatus::*;
        assert_eq!(result(Identified, Identified).outcome(), AnalysisOutcome::Success);
        assert_eq!(result(Identified, Unavailable).outcome(), AnalysisOutcome::Partial);
        assert_eq!(result(Unavailable, Identified).outcome(), AnalysisOutcome::Partial);
        assert_eq!(result(Unavailable, Unavailable).outcome(), AnalysisOutcome::Failed);
    }

    #[test]
    fn test_detection_bbox_is_clamped_on_deserialize() {
        let json = r#"{"label":"cup","confidence":0.91,"bbox":{"x":0.8,"y":-0.1,"width":0.5,"height":0.3}}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.label, "cup");
        assert!((detection.bbox.width - 0.2).abs() < 1e-6);
        assert_eq!(detection.bbox.y, 0.0);
        assert!((detection.bbox.height - 0.2).abs() < 1e-6);
    }
}
