pub mod classification;
pub mod image;
pub mod query;

pub use classification::{AttributeClassifier, CategoryMatch};
pub use image::{ColorExtractionService, ColorExtractor};
pub use query::{filter_by_threshold, FilteredResults, QueryComposer};
