//! Object and color identification
//!
//! - Service traits and their HTTP implementations (services.rs, http.rs)
//! - The label/color pipeline (pipeline.rs)
//! - Locale instructions and color-name localization (prompts.rs, color_names.rs)

pub mod color_names;
pub mod http;
pub mod pipeline;
pub mod prompts;
pub mod services;

pub use color_names::{ColorLocalizer, ColorNameTable};
pub use http::{ChatLabelClient, ColorServiceClient, DetectionServiceClient};
pub use pipeline::{AnalysisPipeline, AnalysisRequest, LabelContext};
pub use prompts::{DEFAULT_LOCALE, Locale, SUPPORTED_LOCALES};
pub use services::{ColorClassifier, LabelClassifier, ObjectDetector};
