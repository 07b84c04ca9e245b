use serde::Serialize;

/// Listing position kept in the URL: `?page=<n>&category=<name>`.
///
/// Absent or unusable values fall back to page 1 and no category filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageState {
    page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: 1,
            category: None,
        }
    }
}

impl PageState {
    pub fn new(page: usize, category: Option<&str>) -> Self {
        Self {
            page: page.max(1),
            category: normalize_category(category),
        }
    }

    /// Build from raw query parameter values.
    pub fn from_params(page: Option<&str>, category: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        Self::new(page, category)
    }

    /// Render as a query string, without the leading `?`.
    pub fn to_query(&self) -> String {
        match &self.category {
            Some(category) => format!(
                "page={}&category={}",
                self.page,
                urlencoding::encode(category)
            ),
            None => format!("page={}", self.page),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// New category filter; always back to page 1.
    pub fn with_category(&self, category: Option<&str>) -> Self {
        Self::new(1, category)
    }

    /// Move to `page`, keeping the category filter.
    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page: page.max(1),
            category: self.category.clone(),
        }
    }

    /// Following page, if there is one.
    pub fn next(&self, page_count: usize) -> Option<Self> {
        (self.page < page_count).then(|| self.with_page(self.page + 1))
    }

    /// Preceding page, if there is one.
    pub fn prev(&self) -> Option<Self> {
        (self.page > 1).then(|| self.with_page(self.page - 1))
    }
}

/// Blank means no filter; anything else is kept as given so it must match
/// a category name exactly.
fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
}
