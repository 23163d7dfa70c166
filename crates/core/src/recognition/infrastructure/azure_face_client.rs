use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::imaging::domain::image_encoder::ImageEncoder;
use crate::imaging::infrastructure::png_encoder::PngImageEncoder;
use crate::recognition::domain::face_api_error::FaceApiError;
use crate::recognition::domain::face_recognizer::{
    Candidate, DetectedFace, FaceId, FaceRecognizer, GroupResult, IdentifyOptions, IdentifyResult,
};
use crate::shared::bitmap::Bitmap;
use crate::shared::config::FaceApiConfig;
use crate::shared::constants::IDENTIFY_BATCH_LIMIT;
use crate::shared::face_rectangle::FaceRectangle;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const API_PREFIX: &str = "face/v1.0";

/// Blocking client for the Azure Face REST API (v1.0).
///
/// Holds one HTTP session for its whole lifetime. Requests are never retried.
pub struct AzureFaceClient {
    config: FaceApiConfig,
    http: Client,
    encoder: Box<dyn ImageEncoder>,
}

impl AzureFaceClient {
    pub fn new(config: FaceApiConfig) -> Result<Self, FaceApiError> {
        let http = Client::builder()
            .build()
            .map_err(|e| FaceApiError::Transport {
                url: config.endpoint.clone(),
                source: e,
            })?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: FaceApiConfig, http: Client) -> Self {
        Self {
            config,
            http,
            encoder: Box::new(PngImageEncoder::new()),
        }
    }

    fn url(&self, operation: &str) -> String {
        format!("{}/{API_PREFIX}/{operation}", self.config.endpoint)
    }

    fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T, FaceApiError> {
        log::debug!("POST {url}");
        let response = request
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.subscription_key)
            .send()
            .map_err(|e| FaceApiError::Transport {
                url: url.to_string(),
                source: e,
            })?;
        check_status(response)?
            .json::<T>()
            .map_err(|e| FaceApiError::Decode {
                url: url.to_string(),
                source: e,
            })
    }
}

impl FaceRecognizer for AzureFaceClient {
    fn detect(&self, image: &Bitmap) -> Result<Vec<DetectedFace>, FaceApiError> {
        let body = self.encoder.encode(image)?;
        let url = self.url("detect");
        let request = self
            .http
            .post(&url)
            .query(&[
                ("returnFaceId", "true"),
                ("recognitionModel", self.config.recognition_model.as_str()),
            ])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body);

        let faces: Vec<WireDetectedFace> = self.send(&url, request)?;
        log::debug!("detect returned {} faces", faces.len());
        Ok(faces.into_iter().map(WireDetectedFace::into_domain).collect())
    }

    fn identify(
        &self,
        face_ids: &[FaceId],
        options: &IdentifyOptions,
    ) -> Result<Vec<IdentifyResult>, FaceApiError> {
        if face_ids.is_empty() || face_ids.len() > IDENTIFY_BATCH_LIMIT {
            return Err(FaceApiError::BatchSize {
                count: face_ids.len(),
                limit: IDENTIFY_BATCH_LIMIT,
            });
        }

        let url = self.url("identify");
        let payload = IdentifyRequest {
            face_ids: face_ids.iter().map(FaceId::as_str).collect(),
            person_group_id: &options.person_group_id,
            max_num_of_candidates_returned: options.max_candidates,
            confidence_threshold: options.confidence_threshold,
        };
        let request = self.http.post(&url).json(&payload);

        let results: Vec<WireIdentifyResult> = self.send(&url, request)?;
        Ok(results
            .into_iter()
            .map(WireIdentifyResult::into_domain)
            .collect())
    }

    fn group(&self, face_ids: &[FaceId]) -> Result<GroupResult, FaceApiError> {
        let url = self.url("group");
        let payload = GroupRequest {
            face_ids: face_ids.iter().map(FaceId::as_str).collect(),
        };
        let request = self.http.post(&url).json(&payload);

        let result: WireGroupResult = self.send(&url, request)?;
        Ok(result.into_domain())
    }
}

/// Turns a non-success response into [`FaceApiError::Status`], preferring the
/// service's own error code and message over the canonical reason phrase.
fn check_status(response: Response) -> Result<Response, FaceApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<WireErrorBody>(&body)
        .ok()
        .map(|b| b.error.describe())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    Err(FaceApiError::Status { status, message })
}

// --- Wire format ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyRequest<'a> {
    face_ids: Vec<&'a str>,
    person_group_id: &'a str,
    max_num_of_candidates_returned: u32,
    confidence_threshold: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupRequest<'a> {
    face_ids: Vec<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDetectedFace {
    face_id: String,
    face_rectangle: FaceRectangle,
}

impl WireDetectedFace {
    fn into_domain(self) -> DetectedFace {
        DetectedFace {
            face_id: FaceId::new(self.face_id),
            rectangle: self.face_rectangle,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    person_id: String,
    confidence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireIdentifyResult {
    face_id: String,
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

impl WireIdentifyResult {
    fn into_domain(self) -> IdentifyResult {
        let mut candidates: Vec<Candidate> = self
            .candidates
            .into_iter()
            .map(|c| Candidate {
                person_id: c.person_id,
                confidence: c.confidence,
            })
            .collect();
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        IdentifyResult {
            face_id: FaceId::new(self.face_id),
            candidates,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroupResult {
    #[serde(default)]
    groups: Vec<Vec<String>>,
    #[serde(default)]
    messy_group: Vec<String>,
}

impl WireGroupResult {
    fn into_domain(self) -> GroupResult {
        GroupResult {
            groups: self
                .groups
                .into_iter()
                .map(|g| g.into_iter().map(FaceId::new).collect())
                .collect(),
            messy_group: self.messy_group.into_iter().map(FaceId::new).collect(),
        }
    }
}

#[derive(Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

impl WireErrorDetail {
    fn describe(self) -> String {
        match (self.code, self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code,
            (None, Some(message)) => message,
            (None, None) => "unknown error".to_string(),
        }
    }
}
