use std::future::Future;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::{collections, ApiClient, ListQuery};
use crate::models::MarketplaceItem;

/// Listings fetched for the first render before the full list arrives.
pub const FIRST_PAGE_SIZE: u32 = 50;

/// Where the context loads listings from.
pub trait ListingSource {
    fn first_page(&self, per_page: u32) -> impl Future<Output = Result<Vec<MarketplaceItem>>> + Send;

    fn all_listings(&self) -> impl Future<Output = Result<Vec<MarketplaceItem>>> + Send;
}

impl ListingSource for ApiClient {
    async fn first_page(&self, per_page: u32) -> Result<Vec<MarketplaceItem>> {
        Ok(self.fetch_marketplace_page(1, per_page).await?.items)
    }

    async fn all_listings(&self) -> Result<Vec<MarketplaceItem>> {
        let query = ListQuery::new().sort("-timestamp");
        self.get_full_list(collections::MARKETPLACE, &query).await
    }
}

/// Live listings held across view switches.
#[derive(Debug, Default)]
pub struct MarketplaceContext {
    items: Vec<MarketplaceItem>,
    /// The full list replaced the first page.
    complete: bool,
    error: Option<String>,
}

impl MarketplaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[MarketplaceItem] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        !self.items.is_empty()
    }

    /// True once the full list is held, false while only the first page is.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the first page so a view can render right away.
    pub async fn load_initial<L: ListingSource>(&mut self, source: &L) -> Result<()> {
        self.error = None;

        match source.first_page(FIRST_PAGE_SIZE).await {
            Ok(items) => {
                debug!(count = items.len(), "Loaded first marketplace page");
                self.items = items;
                self.complete = false;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the first page with the full listing. On failure the first
    /// page stays in place.
    pub async fn load_remaining<L: ListingSource>(&mut self, source: &L) -> Result<()> {
        match source.all_listings().await {
            Ok(items) => {
                info!(count = items.len(), "Loaded all marketplace listings");
                self.items = items;
                self.complete = true;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load remaining marketplace listings");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Load listings unless the full list is already held. A context left
    /// with only the first page fetches just the full list.
    pub async fn ensure_loaded<L: ListingSource>(&mut self, source: &L) -> Result<()> {
        if self.complete {
            return Ok(());
        }
        if !self.is_loaded() {
            self.load_initial(source).await?;
        }
        self.load_remaining(source).await
    }

    /// Drop held listings so the next `ensure_loaded` fetches again.
    pub fn refresh(&mut self) {
        self.items.clear();
        self.complete = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeListings {
        total: usize,
        fail_full_list: bool,
        first_calls: AtomicUsize,
        full_calls: AtomicUsize,
    }

    impl FakeListings {
        fn new(total: usize) -> Self {
            Self {
                total,
                fail_full_list: false,
                first_calls: AtomicUsize::new(0),
                full_calls: AtomicUsize::new(0),
            }
        }

        fn items(&self, count: usize) -> Vec<MarketplaceItem> {
            (0..count)
                .map(|i| MarketplaceItem {
                    id: format!("rec{}", i),
                    asvz_id: (500_000 + i).to_string(),
                    title: format!("Listing {}", i),
                    price: Some(100.0),
                    user: "seller".into(),
                    timestamp: String::new(),
                    updated: String::new(),
                    description: None,
                    url: None,
                })
                .collect()
        }
    }

    impl ListingSource for FakeListings {
        async fn first_page(&self, per_page: u32) -> Result<Vec<MarketplaceItem>> {
            self.first_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.items(self.total.min(per_page as usize)))
        }

        async fn all_listings(&self) -> Result<Vec<MarketplaceItem>> {
            self.full_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_full_list {
                anyhow::bail!("connection reset");
            }
            Ok(self.items(self.total))
        }
    }

    #[tokio::test]
    async fn test_ensure_loaded_fetches_once() {
        let source = FakeListings::new(120);
        let mut context = MarketplaceContext::new();

        context.ensure_loaded(&source).await.unwrap();
        assert_eq!(context.items().len(), 120);
        assert!(context.is_complete());

        context.ensure_loaded(&source).await.unwrap();
        assert_eq!(source.first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.full_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_page_is_capped() {
        let source = FakeListings::new(120);
        let mut context = MarketplaceContext::new();

        context.load_initial(&source).await.unwrap();
        assert_eq!(context.items().len(), FIRST_PAGE_SIZE as usize);
        assert!(context.is_loaded());
        assert!(!context.is_complete());
    }

    #[tokio::test]
    async fn test_failed_full_list_keeps_first_page() {
        let source = FakeListings {
            fail_full_list: true,
            ..FakeListings::new(80)
        };
        let mut context = MarketplaceContext::new();

        assert!(context.ensure_loaded(&source).await.is_err());
        assert_eq!(context.items().len(), FIRST_PAGE_SIZE as usize);
        assert_eq!(context.error(), Some("connection reset"));
        assert!(!context.is_complete());

        // Only the full list is fetched again
        assert!(context.ensure_loaded(&source).await.is_err());
        assert_eq!(source.first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.full_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_forces_refetch() {
        let source = FakeListings::new(10);
        let mut context = MarketplaceContext::new();

        context.ensure_loaded(&source).await.unwrap();
        context.refresh();
        assert!(!context.is_loaded());
        assert!(!context.is_complete());

        context.ensure_loaded(&source).await.unwrap();
        assert_eq!(source.first_calls.load(Ordering::SeqCst), 2);
        assert_eq!(context.items().len(), 10);
    }
}
