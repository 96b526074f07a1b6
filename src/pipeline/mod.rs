pub mod orchestration;
pub mod services;
pub mod types;

pub use orchestration::{Completion, DiscoveryFlow, DiscoverySession, FlowPhase};
pub use services::{AttributeClassifier, ColorExtractor, FilteredResults, QueryComposer};
pub use types::{AnalysisResult, Candidate, ImageSource, InferredProfile, Product, Threshold};
