use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use stay_advisor::RecommendationResult;
use tracing::debug;

/// Outcome of one `/recommend` call, kept so it can be fetched again.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecommendation {
    pub request_id: String,
    pub query: String,
    pub result: RecommendationResult,
    pub created_at: DateTime<Utc>,
}

/// Trait for storing and retrieving recommendation outcomes
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn save(&self, record: StoredRecommendation) -> Result<()>;
    async fn get(&self, request_id: &str) -> Result<Option<StoredRecommendation>>;
}

pub const DEFAULT_STORE_CAPACITY: usize = 1000;

/// In-memory implementation of RecommendationStore.
///
/// Holds at most `capacity` records; saving past that evicts the oldest by
/// `created_at`.
pub struct InMemoryRecommendationStore {
    records: Arc<DashMap<String, StoredRecommendation>>,
    capacity: usize,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }

    /// `capacity` is raised to 1 if zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn evict_oldest(&self) {
        while self.records.len() > self.capacity {
            let oldest = self
                .records
                .iter()
                .min_by_key(|entry| entry.created_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(request_id) => {
                    debug!(request_id = %request_id, "Evicting oldest stored recommendation");
                    self.records.remove(&request_id);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryRecommendationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn save(&self, record: StoredRecommendation) -> Result<()> {
        self.records.insert(record.request_id.clone(), record);
        self.evict_oldest();
        Ok(())
    }

    async fn get(&self, request_id: &str) -> Result<Option<StoredRecommendation>> {
        Ok(self.records.get(request_id).map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(request_id: &str, created_at: DateTime<Utc>) -> StoredRecommendation {
        StoredRecommendation {
            request_id: request_id.to_string(),
            query: "a flat".to_string(),
            result: RecommendationResult::NeedMoreInfo,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = InMemoryRecommendationStore::new();
        store.save(record("req-1", Utc::now())).await.unwrap();

        let stored = store.get("req-1").await.unwrap().unwrap();
        assert_eq!(stored.query, "a flat");
        assert_eq!(stored.result, RecommendationResult::NeedMoreInfo);
        assert!(store.get("req-2").await.unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_oldest_record_is_evicted_past_capacity() {
        let store = InMemoryRecommendationStore::with_capacity(2);
        let start = Utc::now();

        store.save(record("second", start + Duration::seconds(1))).await.unwrap();
        store.save(record("first", start)).await.unwrap();
        store.save(record("third", start + Duration::seconds(2))).await.unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("first").await.unwrap().is_none());
        assert!(store.get("second").await.unwrap().is_some());
        assert!(store.get("third").await.unwrap().is_some());
    }
}
