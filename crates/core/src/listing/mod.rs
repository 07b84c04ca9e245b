//! Community listing: category filter, pagination, and URL page state.

mod state;

pub use state::PageState;

use serde::Serialize;

use crate::models::Community;
use crate::search::CommunitySearch;

/// Communities per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 21;

/// Records that carry a category.
pub trait Categorized {
    fn category(&self) -> &str;
}

impl Categorized for Community {
    fn category(&self) -> &str {
        &self.category
    }
}

/// One page of a filtered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Requested page (1-based), even when it is past the end.
    pub page: usize,
    pub page_count: usize,
    /// Number of records after filtering.
    pub total: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    /// Nothing to show: render the "no results" state.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Keep records whose category equals `category` exactly. `None` keeps all.
pub fn filter_by_category<'a, T: Categorized>(items: &'a [T], category: Option<&str>) -> Vec<&'a T> {
    match category {
        Some(category) => items.iter().filter(|i| i.category() == category).collect(),
        None => items.iter().collect(),
    }
}

/// Slice page `page` (1-based) out of `items`.
///
/// `page_count = ceil(len / page_size)`; a page past the end is empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total = items.len();
    let page_count = total.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = page.saturating_mul(page_size).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        page_count,
        total,
        page_size,
    }
}

/// Filter by the state's category, then cut out the state's page.
pub fn community_page(
    communities: &[Community],
    state: &PageState,
    page_size: usize,
) -> Page<Community> {
    let filtered: Vec<Community> = filter_by_category(communities, state.category())
        .into_iter()
        .cloned()
        .collect();
    paginate(&filtered, state.page(), page_size)
}

/// Search, filter, and paginate in one step.
pub fn community_listing(
    search: &CommunitySearch,
    query: &str,
    state: &PageState,
    page_size: usize,
) -> Page<Community> {
    let matches = search.search(query);
    community_page(&matches, state, page_size)
}
