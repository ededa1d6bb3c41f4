use thiserror::Error;

// Errors from acquiring and preparing images

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Camera permission denied")]
    PermissionDenied,
    #[error("Failed to capture still: {0}")]
    CaptureFailed(String),
    #[error("Failed to crop image: {0}")]
    CropFailed(String),
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to access image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image task was cancelled: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// Errors from a single classification or detection call

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Service answered with status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

impl From<ureq::Error> for ClassifyError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => ClassifyError::Status(code),
            other => ClassifyError::Transport(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ClassifyError {
    fn from(err: tokio::task::JoinError) -> Self {
        ClassifyError::Transport(err.to_string())
    }
}

// One failed auto-mode sample; the session clears its detections and keeps polling

#[derive(Error, Debug)]
pub enum PollTickError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Detect(#[from] ClassifyError),
}
