use serde::Serialize;

use crate::pipeline::types::ImageReference;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Payload submitted to the similarity-search collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub image: ImageReference,
    pub keywords: Vec<String>,
    pub name: String,
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub colors: Vec<String>,
    pub limit: usize,
}
