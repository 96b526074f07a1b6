use async_trait::async_trait;

use crate::error::AppError;
use crate::pipeline::types::{
    AcquiredImage, AnalysisResult, Candidate, ImageReference, ImageSource, Product, SaveRequest,
    SearchQuery,
};

/// Resolves a local file or remote URL into an embeddable image reference.
#[async_trait]
pub trait ImageAcquirer: Send + Sync {
    async fn acquire(&self, source: &ImageSource) -> Result<AcquiredImage, AppError>;
}

#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image: &ImageReference) -> Result<AnalysisResult, AppError>;
}

#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, AppError>;

    async fn related(&self, product_id: &str, limit: usize) -> Result<Vec<Candidate>, AppError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn save(&self, request: SaveRequest) -> Result<Product, AppError>;

    async fn list(&self) -> Result<Vec<Product>, AppError>;

    async fn delete(&self, product_id: &str) -> Result<(), AppError>;
}
