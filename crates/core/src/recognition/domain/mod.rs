pub mod face_api_error;
pub mod face_batches;
pub mod face_recognizer;
