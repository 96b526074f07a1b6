pub mod config;
pub mod error;
pub mod network;
pub mod pipeline;

pub use config::Configuration;
pub use error::AppError;

pub use network::CatalogClient;
pub use pipeline::DiscoverySession;
