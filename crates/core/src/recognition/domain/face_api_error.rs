use reqwest::StatusCode;
use thiserror::Error;

use crate::imaging::domain::image_encoder::EncodeError;

#[derive(Error, Debug)]
pub enum FaceApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("face service returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("identify accepts 1 to {limit} face ids per request, got {count}")]
    BatchSize { count: usize, limit: usize },
    #[error("failed to encode image for detection: {0}")]
    Encode(#[from] EncodeError),
}
