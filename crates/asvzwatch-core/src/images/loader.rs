use anyhow::Result;
use tracing::debug;

use crate::storage::DurableStore;

use super::cache::{ImageCache, ImageEntry, ImageMap};
use super::source::{lookup_batch, ImageSource, ResolvedImage};

/// A pending batched lookup, tied to the page that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTicket {
    generation: u64,
    ids: Vec<String>,
}

impl BatchTicket {
    /// The ids to look up, all unknown to the cache when the ticket was issued.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Image state of one view.
///
/// Every `show_page` starts a new generation. A ticket from an older
/// generation still fills the shared cache when it finishes, but never
/// changes what the view shows.
#[derive(Debug, Clone)]
pub struct PageImages {
    generation: u64,
    urls: ImageMap,
    loading: bool,
}

impl Default for PageImages {
    fn default() -> Self {
        Self::new()
    }
}

impl PageImages {
    /// A view that has not shown a page yet reports `loading`.
    pub fn new() -> Self {
        Self {
            generation: 0,
            urls: ImageMap::new(),
            loading: true,
        }
    }

    /// Switch to `page`. Returns `None` when every id is already cached, in
    /// which case the view is up to date immediately; otherwise returns the
    /// single batch to run for the unknown ids.
    pub fn show_page<S: DurableStore, T: AsRef<str>>(
        &mut self,
        cache: &ImageCache<S>,
        page: &[T],
    ) -> Option<BatchTicket> {
        self.generation += 1;
        let unknown = cache.unknown(page);

        if unknown.is_empty() {
            self.urls = cache.entries().clone();
            self.loading = false;
            return None;
        }

        debug!(generation = self.generation, unknown = unknown.len(), "Page needs image lookup");
        self.loading = true;
        Some(BatchTicket {
            generation: self.generation,
            ids: unknown,
        })
    }

    /// Commit a batch result to the cache. Returns false, leaving the view
    /// as it is, if the view moved on since the ticket was issued.
    pub fn finish<S: DurableStore>(
        &mut self,
        cache: &mut ImageCache<S>,
        ticket: BatchTicket,
        result: Result<Vec<ResolvedImage>>,
    ) -> bool {
        cache.apply_batch(&ticket.ids, result);

        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Image batch finished for a page no longer shown"
            );
            return false;
        }

        self.urls = cache.entries().clone();
        self.loading = false;
        true
    }

    /// The view went away; any ticket still in flight becomes stale.
    pub fn leave(&mut self) {
        self.generation += 1;
    }

    /// Show `page` and, if needed, run its batch to completion.
    pub async fn load_page<S, I, T>(&mut self, cache: &mut ImageCache<S>, source: &I, page: &[T])
    where
        S: DurableStore,
        I: ImageSource,
        T: AsRef<str>,
    {
        if let Some(ticket) = self.show_page(cache, page) {
            let result = lookup_batch(source, ticket.ids()).await;
            self.finish(cache, ticket, result);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn urls(&self) -> &ImageMap {
        &self.urls
    }

    pub fn entry(&self, asvz_id: &str) -> Option<&ImageEntry> {
        self.urls.get(asvz_id)
    }

    /// The image URL of `asvz_id`, `None` for misses and unknown ids.
    pub fn url(&self, asvz_id: &str) -> Option<&str> {
        self.urls.get(asvz_id).and_then(|e| e.url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::images::STORAGE_KEY;
    use crate::models::ImageRecord;
    use crate::storage::MemoryStore;

    /// Serves images for a fixed set of ids and counts batch requests.
    struct FakeSource {
        available: Vec<&'static str>,
        fail: bool,
        calls: AtomicUsize,
        batches: Mutex<Vec<Vec<String>>>,
    }

    impl FakeSource {
        fn with_images(available: Vec<&'static str>) -> Self {
            Self {
                available,
                fail: false,
                calls: AtomicUsize::new(0),
                batches: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with_images(Vec::new())
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ImageSource for FakeSource {
        async fn batch_lookup(&self, ids: &[String]) -> Result<Vec<ImageRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batches.lock().unwrap().push(ids.to_vec());
            if self.fail {
                anyhow::bail!("network unreachable");
            }
            Ok(ids
                .iter()
                .filter(|id| self.available.contains(&id.as_str()))
                .map(|id| ImageRecord {
                    id: format!("rec{}", id),
                    collection_id: "asvz_images".to_string(),
                    asvz_id: id.clone(),
                    img: None,
                })
                .collect())
        }

        fn build_url(&self, record: &ImageRecord, fallback: &str) -> String {
            format!("http://pb/api/files/{}/{}/{}", record.collection_id, record.id, fallback)
        }
    }

    #[tokio::test]
    async fn test_partial_hit_scenario() {
        let source = FakeSource::with_images(vec!["100"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        view.load_page(&mut cache, &source, &["100", "200"]).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(
            source.batches.lock().unwrap()[0],
            vec!["100".to_string(), "200".to_string()]
        );
        assert_eq!(
            cache.get("100"),
            Some(&ImageEntry::hit("http://pb/api/files/asvz_images/rec100/100.jpg".to_string()))
        );
        assert_eq!(cache.get("200"), Some(&ImageEntry::miss()));
        assert_eq!(view.url("100"), Some("http://pb/api/files/asvz_images/rec100/100.jpg"));
        assert_eq!(view.url("200"), None);
        assert!(!view.is_loading());
        assert!(cache.store().get(STORAGE_KEY).is_some());
    }

    #[tokio::test]
    async fn test_cached_page_issues_no_request() {
        let source = FakeSource::with_images(vec!["100"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        view.load_page(&mut cache, &source, &["100"]).await;
        assert_eq!(source.calls(), 1);

        // Served synchronously: no ticket, loading already false
        let mut other_view = PageImages::new();
        assert!(other_view.show_page(&cache, &["100"]).is_none());
        assert!(!other_view.is_loading());
        assert_eq!(other_view.url("100"), Some("http://pb/api/files/asvz_images/rec100/100.jpg"));

        view.load_page(&mut cache, &source, &["100"]).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_one_batch_per_page() {
        let source = FakeSource::with_images(vec!["1", "3", "5"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        let page: Vec<String> = (1..=24).map(|i| i.to_string()).collect();
        view.load_page(&mut cache, &source, &page).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(source.batches.lock().unwrap()[0].len(), 24);
        assert_eq!(cache.len(), 24);
        assert_eq!(cache.entries().values().filter(|e| e.is_hit()).count(), 3);
    }

    #[tokio::test]
    async fn test_only_unknown_ids_are_requested() {
        let source = FakeSource::with_images(vec!["1", "2", "3"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        view.load_page(&mut cache, &source, &["1", "2"]).await;
        view.load_page(&mut cache, &source, &["2", "3"]).await;

        assert_eq!(source.calls(), 2);
        assert_eq!(source.batches.lock().unwrap()[1], vec!["3".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_batch_is_not_retried() {
        let source = FakeSource::failing();
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        view.load_page(&mut cache, &source, &["1", "2"]).await;
        assert_eq!(cache.get("1"), Some(&ImageEntry::miss()));
        assert_eq!(cache.get("2"), Some(&ImageEntry::miss()));
        assert!(!view.is_loading());

        view.load_page(&mut cache, &source, &["1", "2"]).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_batch_fills_cache_but_not_view() {
        let source = FakeSource::with_images(vec!["a1", "b1"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        let ticket_a = view.show_page(&cache, &["a1", "a2"]).unwrap();
        let ticket_b = view.show_page(&cache, &["b1"]).unwrap();

        let result_a = lookup_batch(&source, ticket_a.ids()).await;
        let result_b = lookup_batch(&source, ticket_b.ids()).await;

        // B resolves and commits; A arrives afterwards
        assert!(view.finish(&mut cache, ticket_b, result_b));
        assert!(!view.finish(&mut cache, ticket_a, result_a));

        assert!(cache.get("b1").unwrap().is_hit());
        assert!(cache.get("a1").unwrap().is_hit());
        assert_eq!(cache.get("a2"), Some(&ImageEntry::miss()));

        assert!(view.url("b1").is_some());
        assert!(view.entry("a1").is_none());
        assert!(view.entry("a2").is_none());
        assert!(!view.is_loading());

        // Going back to A needs no new request
        assert!(view.show_page(&cache, &["a1", "a2"]).is_none());
        assert!(view.url("a1").is_some());
    }

    #[tokio::test]
    async fn test_stale_batch_does_not_clear_loading() {
        let source = FakeSource::with_images(vec!["a1", "b1"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        let ticket_a = view.show_page(&cache, &["a1"]).unwrap();
        let ticket_b = view.show_page(&cache, &["b1"]).unwrap();

        let result_a = lookup_batch(&source, ticket_a.ids()).await;
        assert!(!view.finish(&mut cache, ticket_a, result_a));
        assert!(view.is_loading());
        assert!(view.urls().is_empty());

        let result_b = lookup_batch(&source, ticket_b.ids()).await;
        assert!(view.finish(&mut cache, ticket_b, result_b));
        assert!(!view.is_loading());
        assert!(view.url("b1").is_some());
    }

    #[tokio::test]
    async fn test_leave_keeps_view_but_fills_cache() {
        let source = FakeSource::with_images(vec!["1"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut view = PageImages::new();

        let ticket = view.show_page(&cache, &["1"]).unwrap();
        view.leave();
        let result = lookup_batch(&source, ticket.ids()).await;

        assert!(!view.finish(&mut cache, ticket, result));
        assert!(view.urls().is_empty());
        assert!(cache.get("1").unwrap().is_hit());
    }

    #[tokio::test]
    async fn test_views_have_independent_generations() {
        let source = FakeSource::with_images(vec!["1", "2"]);
        let mut cache = ImageCache::open(MemoryStore::new());
        let mut listings = PageImages::new();
        let mut search = PageImages::new();

        let ticket_listings = listings.show_page(&cache, &["1"]).unwrap();
        let ticket_search = search.show_page(&cache, &["2"]).unwrap();

        let result = lookup_batch(&source, ticket_search.ids()).await;
        assert!(search.finish(&mut cache, ticket_search, result));
        let result = lookup_batch(&source, ticket_listings.ids()).await;
        assert!(listings.finish(&mut cache, ticket_listings, result));

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_new_view_is_loading() {
        let view = PageImages::default();
        assert!(view.is_loading());
        assert!(view.urls().is_empty());
    }
}
