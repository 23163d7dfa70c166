use crate::recognition::domain::face_recognizer::FaceId;

/// Splits `face_ids` into consecutive slices of at most `limit` ids.
///
/// Order is preserved and every id appears in exactly one slice. A `limit`
/// of zero is treated as one.
pub fn chunk_face_ids(face_ids: &[FaceId], limit: usize) -> Vec<&[FaceId]> {
    face_ids.chunks(limit.max(1)).collect()
}
