use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use tokio::sync::Notify;

use crate::error::AppError;
use crate::network::{read_local_image, CatalogStore, ImageAcquirer, ImageAnalyzer, SimilaritySearch};
use crate::pipeline::types::{
    AcquiredImage, AnalysisResult, Candidate, ImageReference, ImageSource, Product, SaveRequest,
    SearchQuery,
};

pub fn candidate(id: &str, similarity: f64) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: format!("Product {id}"),
        category: "Jackets".to_string(),
        image_url: format!("https://cdn.example.com/{id}.jpg"),
        similarity: Some(similarity),
        brand: None,
        description: None,
        tags: vec![],
        colors: vec![],
    }
}

pub fn write_solid_png(path: &Path, color: [u8; 3]) {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(12, 12, Rgb(color)))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// In-memory stand-in for the backend with canned responses.
#[derive(Default)]
pub struct FakeBackend {
    analysis: Option<AnalysisResult>,
    analysis_error: Option<String>,
    results: Vec<Candidate>,
    save_error: Option<String>,
    queries: Mutex<Vec<SearchQuery>>,
    saves: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analysis(mut self, analysis: AnalysisResult) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn failing_analysis(mut self, message: &str) -> Self {
        self.analysis_error = Some(message.to_string());
        self
    }

    pub fn with_results(mut self, results: Vec<Candidate>) -> Self {
        self.results = results;
        self
    }

    pub fn failing_save(mut self, message: &str) -> Self {
        self.save_error = Some(message.to_string());
        self
    }

    pub fn last_query(&self) -> Option<SearchQuery> {
        self.queries.lock().unwrap().last().cloned()
    }

    pub fn search_calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn save_attempts(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAcquirer for FakeBackend {
    async fn acquire(&self, source: &ImageSource) -> Result<AcquiredImage, AppError> {
        match source {
            ImageSource::LocalFile(path) => read_local_image(path).await,
            ImageSource::RemoteUrl(url) => Ok(AcquiredImage::new(ImageReference::from_url(url.as_str()), None)),
        }
    }
}

#[async_trait]
impl ImageAnalyzer for FakeBackend {
    async fn analyze(&self, _image: &ImageReference) -> Result<AnalysisResult, AppError> {
        if let Some(message) = &self.analysis_error {
            return Err(AppError::Analysis(message.clone()));
        }
        Ok(self.analysis.clone().unwrap_or_default())
    }
}

#[async_trait]
impl SimilaritySearch for FakeBackend {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, AppError> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.results.clone())
    }

    async fn related(&self, _product_id: &str, limit: usize) -> Result<Vec<Candidate>, AppError> {
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl CatalogStore for FakeBackend {
    async fn save(&self, request: SaveRequest) -> Result<Product, AppError> {
        let attempt = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(message) = &self.save_error {
            return Err(AppError::Save(message.clone()));
        }
        Ok(Product {
            record_id: format!("saved-{attempt}"),
            id: None,
            name: request.name,
            category: request.category,
            description: None,
            brand: None,
            tags: request.tags,
            colors: request.colors,
            image_url: String::new(),
            created_at: None,
        })
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        Ok(vec![])
    }

    async fn delete(&self, _product_id: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Analyzer that holds every call until [`GatedAnalyzer::release`].
pub struct GatedAnalyzer {
    analysis: AnalysisResult,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedAnalyzer {
    pub fn new(analysis: AnalysisResult) -> Self {
        Self {
            analysis,
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAnalyzer for GatedAnalyzer {
    async fn analyze(&self, _image: &ImageReference) -> Result<AnalysisResult, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.analysis.clone())
    }
}

/// Acquirer that holds URLs containing `marker` until released; everything
/// else resolves immediately.
pub struct GatedAcquirer {
    marker: &'static str,
    gate: Notify,
    held: AtomicUsize,
}

impl GatedAcquirer {
    pub fn new(marker: &'static str) -> Self {
        Self {
            marker,
            gate: Notify::new(),
            held: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAcquirer for GatedAcquirer {
    async fn acquire(&self, source: &ImageSource) -> Result<AcquiredImage, AppError> {
        let url = source.to_string();
        if url.contains(self.marker) {
            self.held.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
        }
        Ok(AcquiredImage::new(ImageReference::from_url(url), None))
    }
}
