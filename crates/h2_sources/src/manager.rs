use std::sync::Arc;

use futures::future::join_all;
use h2_core::{NewsItem, SourceFetcher};
use tracing::{info, warn};

/// Runs a fixed set of fetchers for one query and concatenates their
/// results in registration order. That order is what makes downstream
/// deduplication reproducible, so it is preserved even though the
/// fetchers themselves run concurrently.
#[derive(Default)]
pub struct FetcherSet {
    fetchers: Vec<Arc<dyn SourceFetcher>>,
}

impl FetcherSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fetcher(&mut self, fetcher: Arc<dyn SourceFetcher>) {
        self.fetchers.push(fetcher);
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }

    /// Fetch from every source. A failing source is logged and skipped;
    /// the batch from the remaining sources is still returned.
    pub async fn fetch_all(&self, query: &str) -> Vec<NewsItem> {
        let futures: Vec<_> = self
            .fetchers
            .iter()
            .map(|fetcher| {
                let fetcher = fetcher.clone();
                let query = query.to_string();
                async move { (fetcher.name().to_string(), fetcher.fetch(&query).await) }
            })
            .collect();

        let mut items = Vec::new();
        for (name, result) in join_all(futures).await {
            match result {
                Ok(batch) => {
                    info!(source = name.as_str(), count = batch.len(), "source fetched");
                    items.extend(batch);
                }
                Err(e) => warn!("source {} failed: {}", name, e),
            }
        }
        items
    }
}
