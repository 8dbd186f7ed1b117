use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use h2_core::{Result, SeenStore, SubscriberStore};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct SeenRecord {
    url: String,
    title: String,
    published_at: Option<String>,
}

/// In-process store, good for tests and single-run invocations where
/// nothing needs to survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    subscribers: RwLock<BTreeSet<i64>>,
    seen: RwLock<HashMap<String, SeenRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn add_subscriber(&self, chat_id: i64) -> Result<()> {
        self.subscribers.write().await.insert(chat_id);
        Ok(())
    }

    async fn remove_subscriber(&self, chat_id: i64) -> Result<()> {
        self.subscribers.write().await.remove(&chat_id);
        Ok(())
    }

    async fn list_subscribers(&self) -> Result<Vec<i64>> {
        Ok(self.subscribers.read().await.iter().copied().collect())
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn mark_seen(
        &self,
        id: &str,
        url: &str,
        title: &str,
        published_at: Option<&str>,
    ) -> Result<()> {
        self.seen
            .write()
            .await
            .entry(id.to_string())
            .or_insert_with(|| SeenRecord {
                url: url.to_string(),
                title: title.to_string(),
                published_at: published_at.map(|s| s.to_string()),
            });
        Ok(())
    }

    async fn is_seen(&self, id: &str) -> Result<bool> {
        Ok(self.seen.read().await.contains_key(id))
    }
}
