//! Tiles face images into composites and runs them through a cloud face
//! recognition service for detection, identification and grouping.

pub mod imaging;
pub mod pipeline;
pub mod recognition;
pub mod shared;
