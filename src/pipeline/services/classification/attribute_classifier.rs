use crate::pipeline::types::{InferredProfile, RawAnalysis, FALLBACK_NAME};

use super::rules::{
    first_match, FALLBACK_CATEGORY, FASHION_RULES, GENERIC_RULES, NON_FASHION_TERMS,
};

/// Which tier produced a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatch {
    Fashion(&'static str),
    Generic(&'static str),
    /// No rule matched; reported as "Other".
    Unmatched,
}

impl CategoryMatch {
    pub fn label(&self) -> &'static str {
        match self {
            CategoryMatch::Fashion(label) | CategoryMatch::Generic(label) => label,
            CategoryMatch::Unmatched => FALLBACK_CATEGORY,
        }
    }

    /// The matched label, excluding the "Other" fallback.
    pub fn matched_label(&self) -> Option<&'static str> {
        match self {
            CategoryMatch::Fashion(label) | CategoryMatch::Generic(label) => Some(label),
            CategoryMatch::Unmatched => None,
        }
    }
}

/// Turns a raw analysis into an [`InferredProfile`]. Every derivation is a
/// pure function of its inputs and always yields a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeClassifier;

impl AttributeClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, analysis: &RawAnalysis, extracted_color: Option<&str>) -> InferredProfile {
        let color = self.infer_color(analysis, extracted_color);
        let category = self.infer_category(analysis);
        let name = self.infer_name(analysis, color.as_deref(), category);

        InferredProfile {
            color,
            category: Some(category.label().to_string()),
            name,
        }
    }

    /// Tier 1 then Tier 2.
    pub fn infer_category(&self, analysis: &RawAnalysis) -> CategoryMatch {
        if let Some(label) = self.fashion_category(analysis) {
            return CategoryMatch::Fashion(label);
        }
        match self.generic_category(analysis) {
            Some(label) => CategoryMatch::Generic(label),
            None => CategoryMatch::Unmatched,
        }
    }

    /// Tier 1: normalizes the top category (else top tag) to a fashion label.
    /// Any animal term vetoes the whole tier.
    pub fn fashion_category(&self, analysis: &RawAnalysis) -> Option<&'static str> {
        let top = analysis
            .category_names()
            .next()
            .filter(|name| !name.is_empty())
            .or_else(|| analysis.tag_names().next().filter(|name| !name.is_empty()))?;

        let lowered = top.to_lowercase();
        if NON_FASHION_TERMS.iter().any(|term| lowered.contains(term)) {
            return None;
        }
        first_match(FASHION_RULES, &lowered)
    }

    /// Tier 2: scans all category and tag names together against the generic table.
    pub fn generic_category(&self, analysis: &RawAnalysis) -> Option<&'static str> {
        let haystack = analysis
            .category_names()
            .chain(analysis.tag_names())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        first_match(GENERIC_RULES, &haystack)
    }

    pub fn infer_color(&self, analysis: &RawAnalysis, extracted_color: Option<&str>) -> Option<String> {
        analysis
            .first_dominant_color()
            .or(extracted_color.filter(|c| !c.is_empty()))
            .map(str::to_string)
    }

    /// Caption first; else "<color> <category>" with whichever parts are known;
    /// else "Uploaded Item". Without a color, "Other" alone is not a name.
    pub fn infer_name(
        &self,
        analysis: &RawAnalysis,
        color: Option<&str>,
        category: CategoryMatch,
    ) -> String {
        if let Some(caption) = analysis.first_caption() {
            return capitalize_first(caption);
        }

        match (color, category.matched_label()) {
            (Some(color), _) => format!("{} {}", color, category.label()),
            (None, Some(label)) => label.to_string(),
            (None, None) => FALLBACK_NAME.to_string(),
        }
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
