pub mod catalog_client;
pub mod collaborators;
pub mod image_acquisition;

pub use catalog_client::CatalogClient;
pub use collaborators::{CatalogStore, ImageAcquirer, ImageAnalyzer, SimilaritySearch};
pub use image_acquisition::read_local_image;
