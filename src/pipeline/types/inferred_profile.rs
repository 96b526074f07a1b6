use serde::Serialize;

pub const FALLBACK_NAME: &str = "Uploaded Item";

/// Attributes the classifier derived for one analysis. Recomputed on every
/// analysis; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredProfile {
    pub color: Option<String>,
    pub category: Option<String>,
    pub name: String,
}

impl InferredProfile {
    /// Profile of an image that has not been analyzed yet: only the locally
    /// extracted color is known.
    pub fn from_extracted_color(color: Option<String>) -> Self {
        let name = color.clone().unwrap_or_else(|| FALLBACK_NAME.to_string());
        Self {
            color,
            category: None,
            name,
        }
    }
}

impl Default for InferredProfile {
    fn default() -> Self {
        Self::from_extracted_color(None)
    }
}
