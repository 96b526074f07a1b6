/// One row of an ordered keyword table: any keyword found as a substring
/// selects `label`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

impl CategoryRule {
    pub fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|keyword| haystack.contains(keyword))
    }
}

/// First rule in declared order whose keywords occur in `haystack`.
pub fn first_match(rules: &[CategoryRule], haystack: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| rule.matches(haystack))
        .map(|rule| rule.label)
}

/// Terms that veto the fashion table outright. Matched as substrings, so
/// words that merely contain one ("category" contains "cat") veto as well.
pub const NON_FASHION_TERMS: &[&str] = &[
    "animal",
    "animals",
    "mammal",
    "mammals",
    "carnivore",
    "herbivore",
    "omnivore",
    "wildlife",
    "vertebrate",
    "tiger",
    "lion",
    "leopard",
    "cheetah",
    "dog",
    "cat",
    "bird",
    "elephant",
    "zebra",
    "giraffe",
];

pub const FASHION_RULES: &[CategoryRule] = &[
    CategoryRule {
        label: "Shoes",
        keywords: &["shoe", "sneaker", "boot"],
    },
    CategoryRule {
        label: "Jackets",
        keywords: &["jacket", "coat", "blazer"],
    },
    CategoryRule {
        label: "Hoodies",
        keywords: &["hoodie"],
    },
    CategoryRule {
        label: "T-Shirts",
        keywords: &["t-shirt", "tee", "shirt"],
    },
    CategoryRule {
        label: "Pants",
        keywords: &["jean", "pant", "chino", "trouser"],
    },
    CategoryRule {
        label: "Dresses",
        keywords: &["dress"],
    },
    CategoryRule {
        label: "Shorts",
        keywords: &["short"],
    },
    CategoryRule {
        label: "Skirts",
        keywords: &["skirt"],
    },
    CategoryRule {
        label: "Sweaters",
        keywords: &["sweater", "cardigan"],
    },
];

pub const GENERIC_RULES: &[CategoryRule] = &[
    CategoryRule {
        label: "Electronics",
        keywords: &[
            "smartphone",
            "phone",
            "mobile",
            "laptop",
            "computer",
            "pc",
            "monitor",
            "keyboard",
            "mouse",
            "tablet",
            "camera",
            "headphone",
            "earbuds",
            "earphones",
            "smartwatch",
        ],
    },
    CategoryRule {
        label: "Animal",
        keywords: &[
            "animal",
            "wildlife",
            "mammal",
            "bird",
            "fish",
            "reptile",
            "amphibian",
            "insect",
            "tiger",
            "lion",
            "dog",
            "cat",
        ],
    },
    CategoryRule {
        label: "Vehicle",
        keywords: &[
            "car",
            "vehicle",
            "truck",
            "bus",
            "motorcycle",
            "bike",
            "bicycle",
            "train",
            "boat",
            "ship",
            "airplane",
        ],
    },
    CategoryRule {
        label: "Food",
        keywords: &[
            "food",
            "fruit",
            "vegetable",
            "meal",
            "drink",
            "dessert",
            "dish",
            "cuisine",
        ],
    },
    CategoryRule {
        label: "Plant",
        keywords: &["plant", "tree", "leaf", "flower", "forest", "grass"],
    },
    CategoryRule {
        label: "Building",
        keywords: &[
            "building",
            "architecture",
            "house",
            "skyscraper",
            "city",
            "urban",
            "interior",
            "exterior",
        ],
    },
    CategoryRule {
        label: "Furniture",
        keywords: &[
            "furniture",
            "sofa",
            "chair",
            "table",
            "bed",
            "desk",
            "cabinet",
            "couch",
        ],
    },
    CategoryRule {
        label: "Sports",
        keywords: &[
            "sport",
            "ball",
            "soccer",
            "basketball",
            "tennis",
            "cricket",
            "golf",
            "baseball",
            "hockey",
        ],
    },
    CategoryRule {
        label: "People",
        keywords: &["person", "people", "man", "woman", "boy", "girl", "portrait"],
    },
    CategoryRule {
        label: "Nature",
        keywords: &[
            "nature",
            "landscape",
            "mountain",
            "river",
            "sea",
            "ocean",
            "beach",
            "sky",
            "outdoors",
        ],
    },
    CategoryRule {
        label: "Artwork",
        keywords: &["art", "painting", "drawing", "illustration", "sculpture"],
    },
    CategoryRule {
        label: "Accessory",
        keywords: &["bag", "watch", "sunglasses", "hat", "belt", "jewelry", "scarf"],
    },
];

pub const FALLBACK_CATEGORY: &str = "Other";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_respects_declared_order() {
        // "sweater" would also match, but Shoes is declared first.
        assert_eq!(first_match(FASHION_RULES, "sneaker sweater"), Some("Shoes"));
        assert_eq!(first_match(FASHION_RULES, "red running sneaker"), Some("Shoes"));
        assert_eq!(first_match(FASHION_RULES, "wool cardigan"), Some("Sweaters"));
    }

    #[test]
    fn test_first_match_none() {
        assert_eq!(first_match(FASHION_RULES, "lamp"), None);
        assert_eq!(first_match(GENERIC_RULES, ""), None);
    }

    #[test]
    fn test_substring_matching_is_preserved() {
        // "tee" inside "steel" is a known false positive of substring matching.
        assert_eq!(first_match(FASHION_RULES, "steel"), Some("T-Shirts"));
        // "car" inside "cardigan" hits Vehicle in the generic table.
        assert_eq!(first_match(GENERIC_RULES, "cardigan"), Some("Vehicle"));
    }

    #[test]
    fn test_labels_are_unique() {
        for rules in [FASHION_RULES, GENERIC_RULES] {
            let mut labels: Vec<_> = rules.iter().map(|r| r.label).collect();
            labels.sort_unstable();
            labels.dedup();
            assert_eq!(labels.len(), rules.len());
        }
    }
}
