use serde::{Deserialize, Serialize};

/// A ranked search result. Produced by the search collaborator, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireCandidate", rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    /// Absent on related-product records the backend did not score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub colors: Vec<String>,
}

/// Stored records carry `_id` and sometimes a separate `id` as well.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default, rename = "_id")]
    record_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    similarity: Option<f64>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    colors: Vec<String>,
}

impl From<WireCandidate> for Candidate {
    fn from(wire: WireCandidate) -> Self {
        Self {
            id: wire.record_id.or(wire.id).unwrap_or_default(),
            name: wire.name,
            category: wire.category,
            image_url: wire.image_url,
            similarity: wire.similarity,
            brand: wire.brand,
            description: wire.description,
            tags: wire.tags,
            colors: wire.colors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    High,
    Good,
    Fair,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::High => "high",
            MatchTier::Good => "good",
            MatchTier::Fair => "fair",
        }
    }
}

impl Candidate {
    /// Similarity used for filtering. Unscored candidates count as 0.
    pub fn score(&self) -> f64 {
        self.similarity.unwrap_or(0.0)
    }

    /// `None` when the candidate carries no score.
    pub fn match_tier(&self) -> Option<MatchTier> {
        let similarity = self.similarity?;
        Some(if similarity > 0.8 {
            MatchTier::High
        } else if similarity > 0.6 {
            MatchTier::Good
        } else {
            MatchTier::Fair
        })
    }

    pub fn match_percent(&self) -> Option<u32> {
        self.similarity
            .map(|similarity| (similarity.clamp(0.0, 1.0) * 100.0).round() as u32)
    }
}
