pub mod attribute_classifier;
pub mod rules;

pub use attribute_classifier::{AttributeClassifier, CategoryMatch};
pub use rules::{CategoryRule, FALLBACK_CATEGORY, FASHION_RULES, GENERIC_RULES, NON_FASHION_TERMS};
