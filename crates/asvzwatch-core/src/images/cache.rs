use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::DurableStore;

use super::source::ResolvedImage;

/// Storage key of the persisted cache.
pub const STORAGE_KEY: &str = "asvzImagesCache";

/// What is known about one id's thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub url: Option<String>,
    pub error: bool,
}

impl ImageEntry {
    pub fn hit(url: String) -> Self {
        Self {
            url: Some(url),
            error: false,
        }
    }

    /// No image exists, or the lookup failed.
    pub fn miss() -> Self {
        Self {
            url: None,
            error: true,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.url.is_some()
    }
}

pub type ImageMap = HashMap<String, ImageEntry>;

/// Write-once `asvz_id` → image map backed by durable storage.
pub struct ImageCache<S: DurableStore> {
    entries: ImageMap,
    /// Misses from failed batches, kept in memory only.
    transient: HashSet<String>,
    store: S,
}

impl<S: DurableStore> ImageCache<S> {
    /// Load the persisted cache. Missing or corrupt contents give an
    /// empty cache.
    pub fn open(store: S) -> Self {
        let entries = match store.get(STORAGE_KEY) {
            Some(raw) => match serde_json::from_str::<ImageMap>(&raw) {
                Ok(entries) => {
                    debug!(count = entries.len(), "Loaded image cache");
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse cached images, starting empty");
                    ImageMap::new()
                }
            },
            None => ImageMap::new(),
        };

        Self {
            entries,
            transient: HashSet::new(),
            store,
        }
    }

    pub fn get(&self, asvz_id: &str) -> Option<&ImageEntry> {
        self.entries.get(asvz_id)
    }

    pub fn contains(&self, asvz_id: &str) -> bool {
        self.entries.contains_key(asvz_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &ImageMap {
        &self.entries
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ids of `page` with no entry yet, de-duplicated, in page order.
    pub fn unknown<T: AsRef<str>>(&self, page: &[T]) -> Vec<String> {
        let mut seen = HashSet::new();
        page.iter()
            .map(|id| -> &str { id.as_ref() })
            .filter(|id| !self.entries.contains_key(*id) && seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    /// Record the outcome of a batched lookup for `requested`.
    ///
    /// Every requested id gets an entry: its URL if the batch returned a
    /// record for it, a miss otherwise. A failed batch marks every id as a
    /// miss for this session only; those misses are never written to
    /// storage, so the ids are looked up again after a restart. Ids that already have an entry are left
    /// untouched.
    pub fn apply_batch(&mut self, requested: &[String], result: Result<Vec<ResolvedImage>>) {
        match result {
            Ok(resolved) => {
                let mut found: HashMap<String, String> = resolved
                    .into_iter()
                    .map(|image| (image.asvz_id, image.url))
                    .collect();

                let mut hits = 0;
                for id in requested {
                    let entry = match found.remove(id) {
                        Some(url) => {
                            hits += 1;
                            ImageEntry::hit(url)
                        }
                        None => ImageEntry::miss(),
                    };
                    self.entries.entry(id.clone()).or_insert(entry);
                }

                debug!(requested = requested.len(), hits = hits, "Recorded image batch");
                self.persist();
            }
            Err(e) => {
                warn!(requested = requested.len(), error = %e, "Image batch failed, marking ids as missing");
                for id in requested {
                    if let Entry::Vacant(slot) = self.entries.entry(id.clone()) {
                        slot.insert(ImageEntry::miss());
                        self.transient.insert(id.clone());
                    }
                }
            }
        }
    }

    /// Write the cache, minus failed-batch misses, to storage. Failures
    /// only cost durability.
    fn persist(&self) {
        let snapshot: HashMap<&str, &ImageEntry> = self
            .entries
            .iter()
            .filter(|(id, _)| !self.transient.contains(*id))
            .map(|(id, entry)| (id.as_str(), entry))
            .collect();

        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize image cache");
                return;
            }
        };
        if let Err(e) = self.store.set(STORAGE_KEY, &json) {
            warn!(error = %e, "Failed to save image cache");
        }
    }
}
