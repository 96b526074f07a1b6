use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntry {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
}

/// Output of the external image analyzer. Never mutated once received.
///
/// Deserializes both the flat shape and the nested analyzer shape where
/// colors live under `color.dominantColors` and captions under
/// `description.captions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireAnalysis", rename_all = "camelCase")]
pub struct RawAnalysis {
    pub tags: Vec<Tag>,
    pub categories: Vec<NamedEntry>,
    pub captions: Vec<Caption>,
    pub dominant_colors: Vec<String>,
    pub brands: Vec<NamedEntry>,
}

impl RawAnalysis {
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn brand_names(&self) -> impl Iterator<Item = &str> {
        self.brands.iter().map(|b| b.name.as_str())
    }

    pub fn first_caption(&self) -> Option<&str> {
        self.captions
            .first()
            .map(|c| c.text.as_str())
            .filter(|text| !text.is_empty())
    }

    pub fn first_dominant_color(&self) -> Option<&str> {
        self.dominant_colors
            .first()
            .map(String::as_str)
            .filter(|color| !color.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnalysis {
    #[serde(default)]
    tags: Option<Vec<Tag>>,
    #[serde(default)]
    categories: Option<Vec<NamedEntry>>,
    #[serde(default)]
    captions: Option<Vec<Caption>>,
    #[serde(default)]
    dominant_colors: Option<Vec<String>>,
    #[serde(default)]
    brands: Option<Vec<NamedEntry>>,
    #[serde(default)]
    color: Option<WireColor>,
    #[serde(default)]
    description: Option<WireDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireColor {
    #[serde(default)]
    dominant_colors: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct WireDescription {
    #[serde(default)]
    captions: Option<Vec<Caption>>,
}

impl From<WireAnalysis> for RawAnalysis {
    fn from(wire: WireAnalysis) -> Self {
        let mut captions = wire.captions.unwrap_or_default();
        captions.extend(wire.description.and_then(|d| d.captions).unwrap_or_default());

        let mut dominant_colors = wire.dominant_colors.unwrap_or_default();
        dominant_colors.extend(wire.color.and_then(|c| c.dominant_colors).unwrap_or_default());

        Self {
            tags: wire.tags.unwrap_or_default(),
            categories: wire.categories.unwrap_or_default(),
            captions,
            dominant_colors,
            brands: wire.brands.unwrap_or_default(),
        }
    }
}

/// Overrides that take precedence over anything derived from [`RawAnalysis`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn non_empty_list(value: &Option<Vec<String>>) -> Option<&[String]> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl EnhancedAttributes {
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    pub fn brand(&self) -> Option<&str> {
        non_empty(&self.brand)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn colors(&self) -> Option<&[String]> {
        non_empty_list(&self.colors)
    }

    pub fn tags(&self) -> Option<&[String]> {
        non_empty_list(&self.tags)
    }
}

/// A raw analysis together with the overrides the analyzer sent along with it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub raw: RawAnalysis,
    #[serde(default)]
    pub enhanced_data: Option<EnhancedAttributes>,
}

impl AnalysisResult {
    pub fn new(raw: RawAnalysis) -> Self {
        Self {
            raw,
            enhanced_data: None,
        }
    }

    pub fn with_enhanced(mut self, enhanced: EnhancedAttributes) -> Self {
        self.enhanced_data = Some(enhanced);
        self
    }
}
