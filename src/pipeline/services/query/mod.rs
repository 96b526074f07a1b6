pub mod query_composer;
pub mod result_filter;

pub use query_composer::{QueryComposer, DEFAULT_TAG_KEYWORD_LIMIT};
pub use result_filter::{filter_by_threshold, FilteredResults, NO_RESULTS_MESSAGE};
