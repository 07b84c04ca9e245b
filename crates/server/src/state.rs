use std::sync::Arc;

use agora_core::models::Community;
use agora_core::{
    community_listing, CommunitySearch, Config, Page, PageState, PlatformClient,
    SanitizedConfig, SearchOptions,
};
use tokio::sync::Mutex;

/// Shared application state
pub struct AppState {
    config: Config,
    client: PlatformClient,
    /// Search index of the public community listing.
    search: Mutex<CommunitySearch>,
}

impl AppState {
    pub fn new(config: Config, client: PlatformClient) -> Self {
        let search = CommunitySearch::new(SearchOptions::from(&config.search));
        Self {
            config,
            client,
            search: Mutex::new(search),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn client(&self) -> &PlatformClient {
        &self.client
    }

    pub fn page_size(&self) -> usize {
        self.config.listing.page_size
    }

    pub fn min_withdrawal(&self) -> f64 {
        self.config.payouts.min_withdrawal
    }

    /// Search `communities` for `query`, then filter and paginate by `page`.
    ///
    /// The index is rebuilt only when `communities` is a different
    /// collection than the one last indexed.
    pub async fn community_page(
        &self,
        communities: Arc<Vec<Community>>,
        query: &str,
        page: &PageState,
    ) -> Page<Community> {
        let mut search = self.search.lock().await;
        search.update(communities);
        community_listing(&search, query, page, self.page_size())
    }
}
