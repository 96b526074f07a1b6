use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Configuration;
use crate::error::AppError;
use crate::network::collaborators::{CatalogStore, ImageAnalyzer, SimilaritySearch};
use crate::pipeline::types::{
    AnalysisResult, Candidate, ImageReference, Product, SaveImage, SaveRequest, SearchQuery,
};

const ANALYZE_FAILED: &str = "Analyze failed";
const SEARCH_FAILED: &str = "Search failed";
const SAVE_FAILED: &str = "Failed to save";
const LIST_FAILED: &str = "Failed to fetch products";
const DELETE_FAILED: &str = "Failed to delete product";
const RELATED_FAILED: &str = "Failed to fetch related products";

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    analysis: AnalysisResult,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelatedResponse {
    #[serde(default)]
    related_products: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    product: Product,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    products: Option<Vec<Product>>,
}

/// HTTP client for the catalog backend: analyzer, search, persistence,
/// listing and image fetching all live behind one base URL.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("visual-discovery/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(base_url, http))
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn from_configuration(configuration: &Configuration) -> Result<Self, AppError> {
        Self::new(
            configuration.api_base_url.clone(),
            Duration::from_secs(configuration.request_timeout_secs),
        )
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

fn transport_message(fallback: &str, error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("{fallback}: request timed out")
    } else {
        format!("{fallback}: {error}")
    }
}

/// Sends the request and decodes a JSON body. Transport failures, timeouts
/// and non-2xx responses all become `wrap(message)`, where the message is the
/// payload's `error` string when the backend sent one.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    fallback: &str,
    wrap: fn(String) -> AppError,
) -> Result<T, AppError> {
    let body = send(request, fallback, wrap).await?;
    serde_json::from_slice(&body).map_err(|e| wrap(format!("{fallback}: {e}")))
}

async fn send(
    request: RequestBuilder,
    fallback: &str,
    wrap: fn(String) -> AppError,
) -> Result<Vec<u8>, AppError> {
    let response = request
        .send()
        .await
        .map_err(|e| wrap(transport_message(fallback, &e)))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| wrap(transport_message(fallback, &e)))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorPayload>(&body)
            .ok()
            .and_then(|payload| payload.error)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        warn!("Backend responded {}: {}", status, message);
        return Err(wrap(message));
    }

    Ok(body.to_vec())
}

fn save_form(request: SaveRequest) -> Result<Form, AppError> {
    let colors = request.colors_field();
    let tags = request.tags_field();
    let form = Form::new()
        .text("name", request.name)
        .text("category", request.category)
        .text("brand", request.brand)
        .text("description", request.description)
        .text("colors", colors)
        .text("tags", tags);

    match request.image {
        SaveImage::Url(url) => Ok(form.text("imageUrl", url)),
        SaveImage::File(file) => {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)
                .map_err(|e| AppError::Save(format!("{SAVE_FAILED}: {e}")))?;
            Ok(form.part("imageFile", part))
        }
    }
}

#[async_trait]
impl ImageAnalyzer for CatalogClient {
    async fn analyze(&self, image: &ImageReference) -> Result<AnalysisResult, AppError> {
        debug!("Analyzing image {}", image);
        let request = self
            .http
            .post(self.endpoint("/api/analyze"))
            .json(&serde_json::json!({ "image": image }));

        let response: AnalyzeResponse = send_json(request, ANALYZE_FAILED, AppError::Analysis).await?;
        info!(
            "Analysis returned {} tags, {} categories",
            response.analysis.raw.tags.len(),
            response.analysis.raw.categories.len()
        );
        Ok(response.analysis)
    }
}

#[async_trait]
impl SimilaritySearch for CatalogClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Candidate>, AppError> {
        debug!(
            "Searching with {} keywords, limit {}",
            query.keywords.len(),
            query.limit
        );
        let request = self.http.post(self.endpoint("/api/search")).json(query);

        let response: SearchResponse = send_json(request, SEARCH_FAILED, AppError::Search).await?;
        Ok(response.results.unwrap_or_default())
    }

    async fn related(&self, product_id: &str, limit: usize) -> Result<Vec<Candidate>, AppError> {
        let request = self
            .http
            .get(self.endpoint("/api/related-products"))
            .query(&[("id", product_id.to_string()), ("limit", limit.to_string())]);

        let response: RelatedResponse = send_json(request, RELATED_FAILED, AppError::Catalog).await?;
        let mut related = response.related_products.unwrap_or_default();
        related.truncate(limit);
        Ok(related)
    }
}

#[async_trait]
impl CatalogStore for CatalogClient {
    async fn save(&self, request: SaveRequest) -> Result<Product, AppError> {
        info!("Saving '{}' with image {}", request.name, request.image.describe());
        let form = save_form(request)?;
        let request = self.http.post(self.endpoint("/api/products")).multipart(form);

        let response: SaveResponse = send_json(request, SAVE_FAILED, AppError::Save).await?;
        Ok(response.product)
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let request = self.http.get(self.endpoint("/api/products"));
        let response: ListResponse = send_json(request, LIST_FAILED, AppError::Catalog).await?;
        Ok(response.products.unwrap_or_default())
    }

    async fn delete(&self, product_id: &str) -> Result<(), AppError> {
        info!("Deleting product {}", product_id);
        let request = self
            .http
            .delete(self.endpoint("/api/products"))
            .query(&[("id", product_id)]);

        send(request, DELETE_FAILED, AppError::Catalog).await?;
        Ok(())
    }
}
