pub mod color_extraction_service;

pub use color_extraction_service::{
    ColorExtractionService, ColorExtractor, DEFAULT_SAMPLE_STRIDE,
};
