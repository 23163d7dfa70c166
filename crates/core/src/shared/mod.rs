pub mod bitmap;
pub mod config;
pub mod constants;
pub mod face_rectangle;
