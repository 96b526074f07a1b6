use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

const ENV_PREFIX: &str = "VISUAL_DISCOVERY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub search_limit: usize,
    pub tag_keyword_limit: usize,
    pub min_similarity: f64,
    pub color_sample_stride: usize,
    pub related_limit: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            search_limit: 20,
            tag_keyword_limit: 10,
            min_similarity: 0.5,
            color_sample_stride: 10,
            related_limit: 6,
        }
    }
}

impl Configuration {
    /// Layers an optional config file and `VISUAL_DISCOVERY__*` environment
    /// variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Config("API base URL must not be empty".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.search_limit == 0 {
            return Err(AppError::Config("Search limit must be greater than 0".to_string()));
        }

        if self.tag_keyword_limit == 0 {
            return Err(AppError::Config(
                "Tag keyword limit must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(AppError::Config(
                "Minimum similarity must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.color_sample_stride == 0 {
            return Err(AppError::Config(
                "Color sample stride must be greater than 0".to_string(),
            ));
        }

        if self.related_limit == 0 {
            return Err(AppError::Config("Related limit must be greater than 0".to_string()));
        }

        Ok(())
    }

    // Overrides the API base URL, e.g. from the command line.
    pub fn with_api_base_url(mut self, api_base_url: String) -> Self {
        self.api_base_url = api_base_url;
        self
    }
}
