use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::types::{ImageFile, ImageReference};

pub const FALLBACK_SAVE_CATEGORY: &str = "Accessories";

/// A stored catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub record_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveImage {
    Url(String),
    File(ImageFile),
}

/// Attributes submitted to the catalog when persisting an analyzed image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub name: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub colors: Vec<String>,
    pub tags: Vec<String>,
    pub image: SaveImage,
}

impl SaveRequest {
    pub fn colors_field(&self) -> String {
        self.colors.join(",")
    }

    pub fn tags_field(&self) -> String {
        self.tags.join(",")
    }
}

impl SaveImage {
    pub fn describe(&self) -> String {
        match self {
            SaveImage::Url(url) => ImageReference::from_url(url.clone()).to_string(),
            SaveImage::File(file) => format!("{} ({} bytes)", file.file_name, file.bytes.len()),
        }
    }
}
