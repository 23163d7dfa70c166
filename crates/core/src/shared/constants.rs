/// Side length, in pixels, every source image is normalized to.
pub const DEFAULT_TILE_SIZE: u32 = 100;

/// Composite grids are `DEFAULT_GRID_SIZE x DEFAULT_GRID_SIZE` tiles.
pub const DEFAULT_GRID_SIZE: usize = 6;

/// Byte value of the blank placeholder and normalization canvas.
pub const BLANK_VALUE: u8 = 255;

/// The identify endpoint accepts at most this many face ids per request.
pub const IDENTIFY_BATCH_LIMIT: usize = 10;

pub const DEFAULT_MAX_CANDIDATES: u32 = 1;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.65;
pub const DEFAULT_RECOGNITION_MODEL: &str = "recognition_02";

pub const IMAGE_EXTENSIONS: &[&str] = &["png"];

pub const ENDPOINT_ENV: &str = "FACE_ENDPOINT";
pub const SUBSCRIPTION_KEY_ENV: &str = "FACE_SUBSCRIPTION_KEY";
pub const PERSON_GROUP_ID_ENV: &str = "FACE_PERSON_GROUP_ID";
