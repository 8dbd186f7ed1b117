use async_trait::async_trait;
use crate::types::NewsItem;
use crate::Result;

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Returns the name of this source, used for logging and passthrough.
    fn name(&self) -> &str;

    /// Fetch candidate items for a query. Sources that ignore the query
    /// (e.g. fixed RSS feeds) return their latest entries.
    async fn fetch(&self, query: &str) -> Result<Vec<NewsItem>>;
}
