//! HTTP implementations of the classification services
//!
//! `ureq` is blocking, so every request runs on the tokio blocking pool.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::services::{ColorClassifier, LabelClassifier, ObjectDetector};
use crate::config::SnapLabelConfig;
use crate::domain::Detection;
use crate::error::ClassifyError;

/// Longest label accepted from the label service, in words
const MAX_LABEL_WORDS: usize = 4;

fn agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}

/// Label classifier speaking the OpenAI chat-completions protocol
#[derive(Clone)]
pub struct ChatLabelClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key_env: String,
}

impl ChatLabelClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            agent: agent(timeout),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
        }
    }

    pub fn from_config(config: &SnapLabelConfig) -> Self {
        Self::new(
            &config.label_endpoint,
            &config.label_model,
            &config.api_key_env,
            config.request_timeout(),
        )
    }

    fn api_key(&self) -> Result<String, ClassifyError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClassifyError::MissingCredential(self.api_key_env.clone()))
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl LabelClassifier for ChatLabelClient {
    async fn classify_label(
        &self,
        image: String,
        instruction: &str,
    ) -> Result<String, ClassifyError> {
        let api_key = self.api_key()?;
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": instruction },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:image/jpeg;base64,{image}"),
                            "detail": "low",
                        },
                    },
                ],
            }],
        });
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();

        let text = tokio::task::spawn_blocking(move || -> Result<String, ClassifyError> {
            let mut response = agent
                .post(&endpoint)
                .header("Authorization", &format!("Bearer {api_key}"))
                .send_json(&body)?;
            Ok(response.body_mut().read_to_string()?)
        })
        .await??;

        parse_chat_label(&text)
    }
}

fn parse_chat_label(text: &str) -> Result<String, ClassifyError> {
    let response: ChatResponse =
        serde_json::from_str(text).map_err(|e| ClassifyError::Malformed(e.to_string()))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ClassifyError::Malformed("no choices in response".to_string()))?;
    clean_label(&content)
}

/// Trim quotes and punctuation and keep at most four words
fn clean_label(content: &str) -> Result<String, ClassifyError> {
    let trimmed = content
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c.is_whitespace());
    let label = trimmed
        .split_whitespace()
        .take(MAX_LABEL_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    if label.is_empty() {
        return Err(ClassifyError::Malformed("empty label".to_string()));
    }
    Ok(label)
}

/// Color classifier behind the color service's `/uploadfile` endpoint
#[derive(Clone)]
pub struct ColorServiceClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ColorServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &SnapLabelConfig) -> Self {
        Self::new(&config.color_service_url, config.request_timeout())
    }
}

#[derive(Deserialize)]
struct ColorResponse {
    prediction: Option<String>,
    error: Option<String>,
}

#[async_trait]
impl ColorClassifier for ColorServiceClient {
    async fn classify_color(&self, image: String) -> Result<String, ClassifyError> {
        let url = format!("{}/uploadfile", self.base_url.trim_end_matches('/'));
        let agent = self.agent.clone();
        let text = tokio::task::spawn_blocking(move || -> Result<String, ClassifyError> {
            let mut response = agent.post(&url).send_json(json!({ "file_uri": image }))?;
            Ok(response.body_mut().read_to_string()?)
        })
        .await??;

        parse_color(&text)
    }
}

fn parse_color(text: &str) -> Result<String, ClassifyError> {
    let response: ColorResponse =
        serde_json::from_str(text).map_err(|e| ClassifyError::Malformed(e.to_string()))?;
    match (response.prediction, response.error) {
        (Some(prediction), _) if !prediction.trim().is_empty() => Ok(prediction.trim().to_string()),
        (_, Some(error)) => Err(ClassifyError::Malformed(error)),
        _ => Err(ClassifyError::Malformed("no prediction in response".to_string())),
    }
}

/// Object detector behind the detection service's `/detect-objects` endpoint
#[derive(Clone)]
pub struct DetectionServiceClient {
    agent: ureq::Agent,
    base_url: String,
}

impl DetectionServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &SnapLabelConfig) -> Self {
        Self::new(&config.detection_service_url, config.request_timeout())
    }
}

#[derive(Deserialize)]
struct DetectionResponse {
    detections: Vec<Detection>,
}

#[async_trait]
impl ObjectDetector for DetectionServiceClient {
    async fn detect(&self, image: String) -> Result<Vec<Detection>, ClassifyError> {
        let url = format!("{}/detect-objects", self.base_url.trim_end_matches('/'));
        let agent = self.agent.clone();
        let text = tokio::task::spawn_blocking(move || -> Result<String, ClassifyError> {
            let mut response = agent.post(&url).send_json(json!({ "image": image }))?;
            Ok(response.body_mut().read_to_string()?)
        })
        .await??;

        parse_detections(&text)
    }
}

fn parse_detections(text: &str) -> Result<Vec<Detection>, ClassifyError> {
    let response: DetectionResponse =
        serde_json::from_str(text).map_err(|e| ClassifyError::Malformed(e.to_string()))?;
    Ok(response
        .detections
        .into_iter()
        .map(|d| Detection::new(d.label, d.confidence, d.bbox))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_label_is_trimmed_and_bounded() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  \"Coffee mug.\"\n"}}]}"#;
        assert_eq!(parse_chat_label(body).unwrap(), "Coffee mug");

        let chatty = r#"{"choices":[{"message":{"content":"a small red ceramic coffee mug"}}]}"#;
        assert_eq!(parse_chat_label(chatty).unwrap(), "a small red ceramic");
    }

    #[test]
    fn test_chat_without_choices_is_malformed() {
        let body = r#"{"error":{"message":"invalid key"}}"#;
        assert!(matches!(
            parse_chat_label(body),
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[test]
    fn test_color_prediction_and_error_payloads() {
        assert_eq!(
            parse_color(r#"{"message":"color predicted successfully","prediction":"dark red"}"#)
                .unwrap(),
            "dark red"
        );
        assert!(matches!(
            parse_color(r#"{"error":"cannot identify image file"}"#),
            Err(ClassifyError::Malformed(msg)) if msg == "cannot identify image file"
        ));
        assert!(parse_color("<html>").is_err());
    }

    #[test]
    fn test_detections_are_sanitized() {
        let body = r#"{"detections":[
            {"label":"person","confidence":1.4,"bbox":{"x":0.1,"y":0.2,"width":0.3,"height":0.4}},
            {"label":"cup","confidence":0.55,"bbox":{"x":0.9,"y":0.9,"width":0.5,"height":0.5}}
        ],"count":2}"#;
        let detections = parse_detections(body).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].confidence, 1.0);
        assert!((detections[1].bbox.width - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_missing_api_key_short_circuits() {
        let client = ChatLabelClient::new(
            "http://127.0.0.1:9/v1/chat/completions",
            "gpt-4o-mini",
            "SNAPLABEL_TEST_KEY_THAT_IS_NEVER_SET",
            Duration::from_secs(1),
        );
        let err = client
            .classify_label("AAAA".to_string(), "name it")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::MissingCredential(name) if name == "SNAPLABEL_TEST_KEY_THAT_IS_NEVER_SET"
        ));
    }
}
