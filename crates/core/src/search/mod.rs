//! Fuzzy search over communities.
//!
//! The index is built from one community collection and never modified;
//! `CommunitySearch` rebuilds it only when it is handed a different
//! collection (by `Arc` identity), not on every query.

mod scoring;

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::config::SearchConfig;
use crate::metrics::SEARCH_INDEX_BUILDS;
use crate::models::Community;

pub use scoring::field_similarity;

/// Matching parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Minimum similarity a record needs to be returned.
    pub threshold: f64,
    /// Trimmed queries with fewer characters do not filter.
    pub min_match_len: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            min_match_len: 2,
        }
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            threshold: config.threshold,
            min_match_len: config.min_match_len,
        }
    }
}

/// Lowercased searchable fields of one community.
#[derive(Debug)]
struct IndexedFields {
    name: String,
    description: String,
    category: String,
}

impl IndexedFields {
    fn new(community: &Community) -> Self {
        Self {
            name: community.name.to_lowercase(),
            description: community.description.to_lowercase(),
            category: community.category.to_lowercase(),
        }
    }

    fn score(&self, query: &str) -> f64 {
        [&self.name, &self.description, &self.category]
            .into_iter()
            .map(|field| field_similarity(query, field))
            .fold(0.0, f64::max)
    }
}

/// Immutable fuzzy index over name, description and category.
#[derive(Debug)]
pub struct SearchIndex {
    source: Arc<Vec<Community>>,
    fields: Vec<IndexedFields>,
    options: SearchOptions,
}

impl SearchIndex {
    /// Build an index, or `None` when there is nothing to index.
    pub fn build(source: Arc<Vec<Community>>, options: SearchOptions) -> Option<Self> {
        if source.is_empty() {
            return None;
        }
        let fields = source.iter().map(IndexedFields::new).collect();
        SEARCH_INDEX_BUILDS.inc();
        debug!("Search index built over {} communities", source.len());
        Some(Self {
            source,
            fields,
            options,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn source(&self) -> &Arc<Vec<Community>> {
        &self.source
    }

    /// Communities matching `query`, best first.
    ///
    /// A blank query, or one shorter than the minimum match length, returns
    /// the indexed collection itself (same `Arc`, original order).
    pub fn search(&self, query: &str) -> Arc<Vec<Community>> {
        let query = query.trim();
        if query.is_empty() || query.chars().count() < self.options.min_match_len {
            return Arc::clone(&self.source);
        }

        let query = query.to_lowercase();
        let mut scored: Vec<(usize, f64)> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, fields)| (i, fields.score(&query)))
            .filter(|(_, score)| *score >= self.options.threshold)
            .collect();

        // Stable on ties: equal scores keep collection order.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Arc::new(
            scored
                .into_iter()
                .map(|(i, _)| self.source[i].clone())
                .collect(),
        )
    }
}

/// Search state of one community listing view.
#[derive(Debug, Default)]
pub struct CommunitySearch {
    options: SearchOptions,
    source: Option<Arc<Vec<Community>>>,
    index: Option<SearchIndex>,
}

impl CommunitySearch {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            source: None,
            index: None,
        }
    }

    /// Point the search at `communities`. Rebuilds the index only when this
    /// is a different collection than last time; returns whether it did.
    pub fn update(&mut self, communities: Arc<Vec<Community>>) -> bool {
        if let Some(current) = &self.source {
            if Arc::ptr_eq(current, &communities) {
                return false;
            }
        }
        self.index = SearchIndex::build(Arc::clone(&communities), self.options);
        self.source = Some(communities);
        true
    }

    /// Run a query. Without an index (no or empty collection) the result is
    /// empty.
    pub fn search(&self, query: &str) -> Arc<Vec<Community>> {
        match &self.index {
            Some(index) => index.search(query),
            None => Arc::new(Vec::new()),
        }
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn index_of(communities: Vec<Community>) -> SearchIndex {
        SearchIndex::build(Arc::new(communities), SearchOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let index = index_of(fixtures::communities(5));
        let result = index.search("");
        assert!(Arc::ptr_eq(&result, index.source()));

        let result = index.search("   \t");
        assert!(Arc::ptr_eq(&result, index.source()));
    }

    #[test]
    fn test_ab_finds_abstract_algebra() {
        let index = index_of(vec![fixtures::community(
            "c1",
            "Abstract Algebra Club",
            "Math",
        )]);
        let result = index.search("ab");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Abstract Algebra Club");
    }

    #[test]
    fn test_single_char_returns_unfiltered() {
        let communities = vec![
            fixtures::community("c1", "Abstract Algebra Club", "Math"),
            fixtures::community("c2", "Knitting Circle", "Crafts"),
        ];
        let index = index_of(communities);
        let result = index.search("a");
        assert!(Arc::ptr_eq(&result, index.source()));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_no_index_for_empty_collection() {
        assert!(SearchIndex::build(Arc::new(Vec::new()), SearchOptions::default()).is_none());

        let mut search = CommunitySearch::new(SearchOptions::default());
        search.update(Arc::new(Vec::new()));
        assert!(!search.has_index());
        assert!(search.search("rust").is_empty());
        assert!(search.search("").is_empty());
    }

    #[test]
    fn test_ranks_by_relevance() {
        let index = index_of(vec![
            fixtures::community("c1", "Gardening", "Rust removal tips for tools"),
            fixtures::community("c2", "Rustaceans", "Systems"),
            fixtures::community("c3", "Cooking", "Food"),
        ]);
        let result = index.search("rustacean");
        assert_eq!(result[0].id, "c2");
        assert!(result.iter().all(|c| c.id != "c3"));
    }

    #[test]
    fn test_typo_tolerance() {
        let index = index_of(vec![
            fixtures::community("c1", "Photography", "Art"),
            fixtures::community("c2", "Chess", "Games"),
        ]);
        let result = index.search("photograpy");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "c1");
    }

    #[test]
    fn test_matches_category_and_description() {
        let mut music = fixtures::community("c1", "Jam Session", "Music");
        music.description = "Weekly improvisation".to_string();
        let index = index_of(vec![music, fixtures::community("c2", "Chess", "Games")]);

        assert_eq!(index.search("music")[0].id, "c1");
        assert_eq!(index.search("improv")[0].id, "c1");
    }

    #[test]
    fn test_no_match_is_empty() {
        let index = index_of(fixtures::communities(4));
        assert!(index.search("zzzzqqqq").is_empty());
    }

    #[test]
    fn test_rebuild_only_on_identity_change() {
        let mut search = CommunitySearch::new(SearchOptions::default());
        let list = Arc::new(fixtures::communities(3));

        assert!(search.update(Arc::clone(&list)));
        assert!(!search.update(Arc::clone(&list)));

        // Equal contents, different collection: rebuild.
        let copy = Arc::new((*list).clone());
        assert!(search.update(copy));
    }

    #[test]
    fn test_ties_keep_original_order() {
        let index = index_of(vec![
            fixtures::community("c1", "Rust Club", "Tech"),
            fixtures::community("c2", "Rust Guild", "Tech"),
        ]);
        let result = index.search("rust");
        let ids: Vec<&str> = result.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }
}
