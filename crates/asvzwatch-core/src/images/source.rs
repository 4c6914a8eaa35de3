use std::future::Future;

use anyhow::Result;
use tracing::debug;

use crate::api::{collections, filter, ApiClient, ListQuery};
use crate::models::ImageRecord;

/// Remote side of the image cache.
pub trait ImageSource {
    /// Fetch the image records of all `ids` in a single request.
    fn batch_lookup(&self, ids: &[String]) -> impl Future<Output = Result<Vec<ImageRecord>>> + Send;

    /// Public URL of a record's file; `fallback` names the file when the
    /// record carries none.
    fn build_url(&self, record: &ImageRecord, fallback: &str) -> String;
}

/// An id with the URL its image resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub asvz_id: String,
    pub url: String,
}

/// Run one batched lookup and build the URL of every returned record.
pub async fn lookup_batch<I: ImageSource>(source: &I, ids: &[String]) -> Result<Vec<ResolvedImage>> {
    let records = source.batch_lookup(ids).await?;
    debug!(requested = ids.len(), found = records.len(), "Image batch resolved");

    Ok(records
        .iter()
        .map(|record| {
            let fallback = format!("{}.jpg", record.asvz_id);
            ResolvedImage {
                asvz_id: record.asvz_id.clone(),
                url: source.build_url(record, &fallback),
            }
        })
        .collect())
}

impl ImageSource for ApiClient {
    async fn batch_lookup(&self, ids: &[String]) -> Result<Vec<ImageRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = ListQuery::new().filter(filter::any_of("asvz_id", ids));
        self.get_full_list(collections::IMAGES, &query).await
    }

    fn build_url(&self, record: &ImageRecord, fallback: &str) -> String {
        let collection = if record.collection_id.is_empty() {
            collections::IMAGES
        } else {
            record.collection_id.as_str()
        };
        self.file_url(collection, &record.id, record.filename(fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_build_url() {
        let client = ApiClient::new("http://127.0.0.1:8090").unwrap();
        let record = ImageRecord {
            id: "rec9".into(),
            collection_id: "pbc_42".into(),
            asvz_id: "100".into(),
            img: None,
        };
        assert_eq!(
            client.build_url(&record, "100.jpg"),
            "http://127.0.0.1:8090/api/files/pbc_42/rec9/100.jpg"
        );

        let record = ImageRecord {
            collection_id: String::new(),
            img: Some("front.png".into()),
            ..record
        };
        assert_eq!(
            client.build_url(&record, "100.jpg"),
            "http://127.0.0.1:8090/api/files/asvz_images/rec9/front.png"
        );
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        // Unroutable base URL: any request would fail
        let client = ApiClient::new("http://127.0.0.1:1").unwrap();
        let records = client.batch_lookup(&[]).await.unwrap();
        assert!(records.is_empty());
    }
}
