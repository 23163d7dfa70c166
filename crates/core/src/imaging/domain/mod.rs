pub mod grid_tiler;
pub mod image_encoder;
pub mod image_reader;
pub mod image_writer;
pub mod normalizer;
