//! Dataset queries behind each dashboard view.

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future;
use tracing::{debug, warn};

use crate::models::{
    DeletedItem, Listing, MarketplaceItem, PriceHistory, PricePoint, SearchField, Update,
};
use crate::utils::{parse_timestamp, to_iso};

use super::{collections, filter, ApiClient, ApiError, ListPage, ListQuery};

/// Queries shorter than this return no results without a request.
pub const MIN_SEARCH_LENGTH: usize = 3;

/// Filter for the updates view's optional date range.
pub fn updates_filter(start: Option<&str>, end: Option<&str>) -> Result<String> {
    let bound = |value: Option<&str>, label: &str| -> Result<Option<String>> {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => parse_timestamp(v)
                .map(|dt| Some(to_iso(dt)))
                .ok_or_else(|| anyhow::anyhow!("Invalid {} date: {}", label, v)),
            None => Ok(None),
        }
    };

    let mut clauses = Vec::new();
    if let Some(start) = bound(start, "start")? {
        clauses.push(filter::gte("timestamp", &start));
    }
    if let Some(end) = bound(end, "end")? {
        clauses.push(filter::lte("timestamp", &end));
    }
    Ok(filter::and(&clauses))
}

/// Filter for a text search on `field`.
pub fn search_filter(query: &str, field: SearchField) -> String {
    match field {
        SearchField::Title => filter::like("title", query),
        SearchField::Id => filter::like("asvz_id", query),
        SearchField::User => filter::like("user", query),
        SearchField::All => format!(
            "({} || {} || {})",
            filter::like("title", query),
            filter::like("asvz_id", query),
            filter::like("user", query)
        ),
    }
}

/// The listing's own price as the closing point of its history.
fn closing_point(item: &MarketplaceItem, id: &str) -> Option<PricePoint> {
    let price = item.price?;
    let timestamp = if item.updated.is_empty() {
        to_iso(Utc::now())
    } else {
        item.updated.clone()
    };
    Some(PricePoint {
        id: id.to_string(),
        asvz_id: item.asvz_id.clone(),
        price,
        timestamp,
        title: Some(item.title.clone()),
    })
}

impl ApiClient {
    /// Fetch scraper runs in ascending timestamp order, optionally bounded
    pub async fn fetch_updates(&self, start: Option<&str>, end: Option<&str>) -> Result<Vec<Update>> {
        let query = ListQuery::new()
            .filter(updates_filter(start, end)?)
            .sort("timestamp");
        self.get_full_list(collections::UPDATES, &query)
            .await
            .context("Failed to fetch updates")
    }

    /// Fetch the price series of one listing, closed by its current price
    /// (live) or final price (deleted)
    pub async fn fetch_price_history(&self, asvz_id: &str) -> Result<PriceHistory> {
        let asvz_id = asvz_id.trim();
        if asvz_id.is_empty() {
            return Ok(PriceHistory::default());
        }

        let id_filter = filter::eq("asvz_id", asvz_id);
        let prices_query = ListQuery::new().filter(id_filter.clone()).sort("timestamp");

        let (points, live) = future::join(
            self.get_full_list::<PricePoint>(collections::PRICES, &prices_query),
            self.get_first_list_item::<MarketplaceItem>(collections::MARKETPLACE, &id_filter),
        )
        .await;

        let mut history = PriceHistory {
            title: None,
            points: points.context("Failed to fetch price history")?,
        };

        match live {
            Ok(item) => {
                history.title = Some(item.title.clone());
                history.points.extend(closing_point(&item, "current"));
            }
            Err(e) => {
                if ApiError::is_not_found(&e) {
                    debug!(asvz_id = asvz_id, "Listing not live, checking deleted listings");
                } else {
                    warn!(asvz_id = asvz_id, error = %e, "Live listing lookup failed, checking deleted listings");
                }
                match self
                    .get_first_list_item::<DeletedItem>(collections::MARKETPLACE_DELETED, &id_filter)
                    .await
                {
                    Ok(deleted) => {
                        history.title = Some(deleted.item.title.clone());
                        history.points.extend(closing_point(&deleted.item, "final"));
                    }
                    Err(e) => {
                        debug!(asvz_id = asvz_id, error = %e, "Listing not found");
                    }
                }
            }
        }

        history.sort_chronologically();
        Ok(history)
    }

    /// Fetch all live listings, newest first
    pub async fn fetch_marketplace_items(&self) -> Result<Vec<MarketplaceItem>> {
        let query = ListQuery::new().sort("-created");
        self.get_full_list(collections::MARKETPLACE, &query)
            .await
            .context("Failed to fetch marketplace items")
    }

    /// Fetch one page of live listings, most recently scraped first
    pub async fn fetch_marketplace_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<ListPage<MarketplaceItem>> {
        let query = ListQuery::new().sort("-timestamp");
        self.get_list(collections::MARKETPLACE, page, per_page, &query)
            .await
            .context("Failed to fetch marketplace page")
    }

    /// Search live listings, and deleted ones if asked, on `field`
    pub async fn search_items(
        &self,
        query: &str,
        include_deleted: bool,
        field: SearchField,
    ) -> Result<Vec<Listing>> {
        if query.chars().count() < MIN_SEARCH_LENGTH {
            return Ok(Vec::new());
        }

        let list_query = ListQuery::new()
            .filter(search_filter(query, field))
            .sort("-created");

        let live: Vec<MarketplaceItem> = self
            .get_full_list(collections::MARKETPLACE, &list_query)
            .await
            .context("Failed to search listings")?;

        let mut results: Vec<Listing> = live.into_iter().map(Listing::live).collect();

        if include_deleted {
            let deleted: Vec<DeletedItem> = self
                .get_full_list(collections::MARKETPLACE_DELETED, &list_query)
                .await
                .context("Failed to search deleted listings")?;
            results.extend(deleted.into_iter().map(Listing::deleted));
        }

        debug!(query = query, field = %field, count = results.len(), "Search finished");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updates_filter() {
        assert_eq!(updates_filter(None, None).unwrap(), "");
        assert_eq!(
            updates_filter(Some("2024-05-01T10:00"), None).unwrap(),
            "timestamp >= \"2024-05-01T10:00:00.000Z\""
        );
        assert_eq!(
            updates_filter(Some("2024-05-01"), Some("2024-05-08")).unwrap(),
            "timestamp >= \"2024-05-01T00:00:00.000Z\" && timestamp <= \"2024-05-08T00:00:00.000Z\""
        );
        assert_eq!(
            updates_filter(Some(""), Some("2024-05-08")).unwrap(),
            "timestamp <= \"2024-05-08T00:00:00.000Z\""
        );
        assert!(updates_filter(Some("last week"), None).is_err());
    }

    #[test]
    fn test_search_filter() {
        assert_eq!(search_filter("m4", SearchField::Title), "title ~ \"m4\"");
        assert_eq!(search_filter("5113", SearchField::Id), "asvz_id ~ \"5113\"");
        assert_eq!(search_filter("bob", SearchField::User), "user ~ \"bob\"");
        assert_eq!(
            search_filter("glock", SearchField::All),
            "(title ~ \"glock\" || asvz_id ~ \"glock\" || user ~ \"glock\")"
        );
        assert_eq!(search_filter("a\"b", SearchField::Title), "title ~ \"a\\\"b\"");
    }

    #[test]
    fn test_closing_point() {
        let mut item = MarketplaceItem {
            id: "rec1".into(),
            asvz_id: "100".into(),
            title: "KJ Works M9".into(),
            price: Some(120.0),
            user: "u".into(),
            timestamp: String::new(),
            updated: "2024-05-04 08:00:00.000Z".into(),
            description: None,
            url: None,
        };

        let point = closing_point(&item, "current").unwrap();
        assert_eq!(point.id, "current");
        assert_eq!(point.price, 120.0);
        assert_eq!(point.timestamp, "2024-05-04 08:00:00.000Z");
        assert_eq!(point.title.as_deref(), Some("KJ Works M9"));

        item.updated = String::new();
        assert!(parse_timestamp(&closing_point(&item, "final").unwrap().timestamp).is_some());

        item.price = None;
        assert!(closing_point(&item, "current").is_none());
    }

    #[tokio::test]
    async fn test_short_search_skips_request() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let results = client.search_items("m4", true, SearchField::All).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_price_id_skips_request() {
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let history = client.fetch_price_history("  ").await.unwrap();
        assert!(history.is_empty());
        assert!(history.title.is_none());
    }
}
