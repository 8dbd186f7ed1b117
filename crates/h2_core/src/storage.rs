use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Add a subscriber. Adding an existing id is a no-op.
    async fn add_subscriber(&self, chat_id: i64) -> Result<()>;

    /// Remove a subscriber if present.
    async fn remove_subscriber(&self, chat_id: i64) -> Result<()>;

    /// List all subscriber chat ids.
    async fn list_subscribers(&self) -> Result<Vec<i64>>;
}

#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Record an article id with its metadata. Re-recording is a no-op.
    async fn mark_seen(
        &self,
        id: &str,
        url: &str,
        title: &str,
        published_at: Option<&str>,
    ) -> Result<()>;

    /// Whether an article id has been recorded before.
    async fn is_seen(&self, id: &str) -> Result<bool>;
}
