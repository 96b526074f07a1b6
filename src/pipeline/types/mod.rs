mod acquired_image;
mod candidate;
mod inferred_profile;
mod product;
mod raw_analysis;
mod search_query;
mod threshold;

pub use acquired_image::{
    AcquiredImage, ImageFile, ImageReference, ImageSource, DEFAULT_MIME, DEFAULT_UPLOAD_NAME,
};
pub use candidate::{Candidate, MatchTier};
pub use inferred_profile::{InferredProfile, FALLBACK_NAME};
pub use product::{Product, SaveImage, SaveRequest, FALLBACK_SAVE_CATEGORY};
pub use raw_analysis::{AnalysisResult, Caption, EnhancedAttributes, NamedEntry, RawAnalysis, Tag};
pub use search_query::{SearchQuery, DEFAULT_SEARCH_LIMIT};
pub use threshold::{Threshold, THRESHOLD_STEP};
