use crate::error::AppError;
use crate::pipeline::types::{
    AnalysisResult, EnhancedAttributes, ImageReference, InferredProfile, SearchQuery,
    DEFAULT_SEARCH_LIMIT,
};

pub const DEFAULT_TAG_KEYWORD_LIMIT: usize = 10;

/// Builds the search payload from an analysis, its overrides and the
/// classifier's profile. Override values win field by field.
#[derive(Debug, Clone, Copy)]
pub struct QueryComposer {
    limit: usize,
    tag_keyword_limit: usize,
}

impl QueryComposer {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            tag_keyword_limit: DEFAULT_TAG_KEYWORD_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_tag_keyword_limit(mut self, tag_keyword_limit: usize) -> Self {
        self.tag_keyword_limit = tag_keyword_limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Keywords are tags, then brands, then categories, passed through as
    /// received. Repeats and blank names are kept.
    pub fn compose(
        &self,
        image: Option<&ImageReference>,
        analysis: &AnalysisResult,
        profile: &InferredProfile,
    ) -> Result<SearchQuery, AppError> {
        let image = image.ok_or(AppError::MissingImage)?;
        let raw = &analysis.raw;
        let no_overrides = EnhancedAttributes::default();
        let enhanced = analysis.enhanced_data.as_ref().unwrap_or(&no_overrides);

        let tags: Vec<String> = match enhanced.tags() {
            Some(tags) => tags.to_vec(),
            None => raw
                .tag_names()
                .take(self.tag_keyword_limit)
                .map(str::to_string)
                .collect(),
        };

        let brands: Vec<String> = match enhanced.brand() {
            Some(brand) => vec![brand.to_string()],
            None => raw.brand_names().map(str::to_string).collect(),
        };

        let categories: Vec<String> = match enhanced.category() {
            Some(category) => vec![category.to_string()],
            None => raw.category_names().map(str::to_string).collect(),
        };

        let colors: Vec<String> = match enhanced.colors() {
            Some(colors) => colors.to_vec(),
            None => raw.dominant_colors.clone(),
        };

        let keywords: Vec<String> = tags
            .into_iter()
            .chain(brands)
            .chain(categories)
            .collect();

        Ok(SearchQuery {
            image: image.clone(),
            keywords,
            name: enhanced
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| profile.name.clone()),
            category: enhanced
                .category()
                .map(str::to_string)
                .or_else(|| profile.category.clone()),
            brand: enhanced
                .brand()
                .or_else(|| raw.brand_names().find(|b| !b.is_empty()))
                .map(str::to_string),
            colors,
            limit: self.limit,
        })
    }
}

impl Default for QueryComposer {
    fn default() -> Self {
        Self::new()
    }
}
