use std::fmt;

use crate::recognition::domain::face_api_error::FaceApiError;
use crate::shared::bitmap::Bitmap;
use crate::shared::constants::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_CANDIDATES};
use crate::shared::face_rectangle::FaceRectangle;

/// Opaque token the service issues for one detected face.
///
/// Only valid for the service's retention window (24 hours); never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(String);

impl FaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub face_id: FaceId,
    pub rectangle: FaceRectangle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub person_id: String,
    pub confidence: f64,
}

/// Candidates for one face, best match first.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentifyResult {
    pub face_id: FaceId,
    pub candidates: Vec<Candidate>,
}

impl IdentifyResult {
    pub fn top_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Faces partitioned by similarity, plus the faces that did not cluster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupResult {
    pub groups: Vec<Vec<FaceId>>,
    pub messy_group: Vec<FaceId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentifyOptions {
    pub person_group_id: String,
    pub max_candidates: u32,
    pub confidence_threshold: f64,
}

impl IdentifyOptions {
    pub fn new(person_group_id: impl Into<String>) -> Self {
        Self {
            person_group_id: person_group_id.into(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Domain interface for a face recognition backend.
pub trait FaceRecognizer {
    /// Detects faces in `image`, returning one entry per face.
    fn detect(&self, image: &Bitmap) -> Result<Vec<DetectedFace>, FaceApiError>;

    /// Matches faces against the configured person group.
    ///
    /// Callers must keep `face_ids` within the backend's batch limit.
    fn identify(
        &self,
        face_ids: &[FaceId],
        options: &IdentifyOptions,
    ) -> Result<Vec<IdentifyResult>, FaceApiError>;

    /// Clusters faces by similarity in a single request.
    fn group(&self, face_ids: &[FaceId]) -> Result<GroupResult, FaceApiError>;
}
