/// Catalog module
/// The closed category enumeration and provider filtering

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Provider;

/// Every service category Fixa offers. The assistant's suggestions are
/// validated against this list; anything else is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Plumbing,
    Electrical,
    Cleaning,
    Carpentry,
    Mechanic,
    Painting,
    #[serde(rename = "AC Repair")]
    AcRepair,
    Saloon,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Plumbing,
        Category::Electrical,
        Category::Cleaning,
        Category::Carpentry,
        Category::Mechanic,
        Category::Painting,
        Category::AcRepair,
        Category::Saloon,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Plumbing => "Plumbing",
            Category::Electrical => "Electrical",
            Category::Cleaning => "Cleaning",
            Category::Carpentry => "Carpentry",
            Category::Mechanic => "Mechanic",
            Category::Painting => "Painting",
            Category::AcRepair => "AC Repair",
            Category::Saloon => "Saloon",
        }
    }

    /// Case-insensitive label lookup. Returns None for anything outside the
    /// enumeration.
    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Narrow a provider list by category selector and free-text query.
///
/// The query matches case-insensitively against the provider name or the
/// category label; both conditions compose with AND. No ranking, no
/// pagination. An empty result is a valid state.
pub fn filter_providers<'a>(
    providers: &'a [Provider],
    query: &str,
    category: Option<Category>,
) -> Vec<&'a Provider> {
    let needle = query.trim().to_lowercase();
    providers
        .iter()
        .filter(|p| {
            let matches_category = category.map_or(true, |c| p.category == c);
            let matches_query = needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.category.label().to_lowercase().contains(&needle);
            matches_category && matches_query
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::providers;

    #[test]
    fn category_filter_returns_only_that_category() {
        let hits = filter_providers(providers(), "", Some(Category::Plumbing));
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| p.category == Category::Plumbing));
    }

    #[test]
    fn name_substring_matches_case_insensitively() {
        let lower = filter_providers(providers(), "samuel", None);
        let upper = filter_providers(providers(), "SAMUEL", None);
        assert_eq!(lower.len(), 1);
        assert_eq!(upper.len(), 1);
        assert_eq!(lower[0].id, upper[0].id);
    }

    #[test]
    fn category_label_substring_matches() {
        let hits = filter_providers(providers(), "plumb", None);
        assert!(hits.iter().all(|p| p.category == Category::Plumbing));
        assert!(!hits.is_empty());
    }

    #[test]
    fn unmatched_query_is_an_empty_result_not_an_error() {
        let hits = filter_providers(providers(), "no such provider anywhere", None);
        assert!(hits.is_empty());
    }

    #[test]
    fn query_and_category_compose_with_and() {
        // Samuel is a plumber; asking for him under Cleaning must return nothing.
        let hits = filter_providers(providers(), "samuel", Some(Category::Cleaning));
        assert!(hits.is_empty());
    }

    #[test]
    fn label_parsing_round_trips_and_rejects_unknown() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
        assert_eq!(Category::from_label("ac repair"), Some(Category::AcRepair));
        assert_eq!(Category::from_label("Gardening"), None);
    }
}
