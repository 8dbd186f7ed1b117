use std::collections::HashSet;

use h2_core::NewsItem;
use tracing::debug;

use crate::similarity::cosine_matrix;
use crate::vectorize::{vectorize, DEFAULT_MAX_TERMS};

pub const DEFAULT_THRESHOLD: f32 = 0.82;

#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Pairwise similarity above which two items count as the same story.
    /// The comparison is strictly greater-than; a pair sitting exactly at
    /// the threshold stays apart.
    pub threshold: f32,
    /// Vocabulary cap for the term-weighted vectorizer.
    pub max_terms: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_terms: DEFAULT_MAX_TERMS,
        }
    }
}

/// Collapses a batch of news items into one representative per group of
/// near-duplicates. Stateless: every call works only on the batch it was
/// handed and never errors back to the caller.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self::new(DedupConfig {
            threshold,
            ..DedupConfig::default()
        })
    }

    /// Reduce `items` to one representative per similarity cluster.
    ///
    /// Output order follows the first appearance of each cluster in the
    /// batch, so callers that concatenate fetcher results in a stable
    /// order get reproducible output. When the batch cannot be vectorized
    /// the items are partitioned by URL instead, first occurrence winning.
    pub fn deduplicate(&self, items: &[NewsItem]) -> Vec<NewsItem> {
        if items.is_empty() {
            return Vec::new();
        }

        let texts: Vec<String> = items.iter().map(|it| it.combined_text()).collect();
        match vectorize(&texts, self.config.max_terms) {
            Some(vectors) => self.cluster(items, &vectors),
            None => {
                debug!("no usable vocabulary in batch, partitioning by url");
                dedup_by_url(items)
            }
        }
    }

    fn cluster(&self, items: &[NewsItem], vectors: &[Vec<f32>]) -> Vec<NewsItem> {
        let sim = cosine_matrix(vectors);
        let n = items.len();
        let mut claimed = vec![false; n];
        let mut keep = Vec::new();

        for i in 0..n {
            if claimed[i] {
                continue;
            }
            let cluster: Vec<usize> = (0..n)
                .filter(|&j| sim[i][j] > self.config.threshold)
                .collect();

            // Latest parseable timestamp wins; a cluster with no usable
            // timestamp keeps its earliest member.
            let mut chosen = cluster.first().copied().unwrap_or(i);
            let mut best = 0i64;
            for &j in &cluster {
                if let Some(ts) = items[j].published_ts() {
                    let secs = ts.timestamp();
                    if secs > best {
                        best = secs;
                        chosen = j;
                    }
                }
            }

            keep.push(items[chosen].clone());
            claimed[i] = true;
            for &j in &cluster {
                claimed[j] = true;
            }
        }

        debug!(batch = n, kept = keep.len(), "similarity dedup complete");
        keep
    }
}

/// Fallback partition: keep the first item per URL. Items without a URL
/// share the empty key and collapse into one.
fn dedup_by_url(items: &[NewsItem]) -> Vec<NewsItem> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .iter()
        .filter(|it| seen.insert(it.url_key().to_string()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: if summary.is_empty() {
                None
            } else {
                Some(summary.to_string())
            },
            ..Default::default()
        }
    }

    fn url_only(url: &str) -> NewsItem {
        NewsItem {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_batch() {
        let dedup = Deduplicator::default();
        assert!(dedup.deduplicate(&[]).is_empty());
    }

    #[test]
    fn test_identical_items_merge() {
        let dedup = Deduplicator::default();
        let a = item("Linde opens 100MW electrolyzer plant", "Largest in Europe");
        let batch = vec![a.clone(), a.clone(), a.clone()];
        let kept = dedup.deduplicate(&batch);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, a.title);
    }

    #[test]
    fn test_distinct_items_survive() {
        let dedup = Deduplicator::default();
        let batch = vec![
            item("Ammonia cracker commissioned in Rotterdam", "First of its kind"),
            item("Fuel cell truck fleet expands in California", "Heavy duty"),
            item("Electrolyzer subsidy round announced", "Brussels program"),
        ];
        let kept = dedup.deduplicate(&batch);
        assert_eq!(kept.len(), 3);
        // Cluster-discovery order is input order.
        assert_eq!(kept[0].title, batch[0].title);
        assert_eq!(kept[2].title, batch[2].title);
    }

    #[test]
    fn test_cardinality_never_grows() {
        let dedup = Deduplicator::default();
        let batch = vec![
            item("Green hydrogen auction clears record price", ""),
            item("Green hydrogen auction clears record price", ""),
            item("Pipeline operator plans H2 conversion", ""),
        ];
        let kept = dedup.deduplicate(&batch);
        assert!(kept.len() <= batch.len());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_threshold_is_strict() {
        // At threshold 1.0 even identical items (similarity exactly 1.0)
        // are not merged, because membership needs strictly greater.
        let dedup = Deduplicator::with_threshold(1.0);
        let a = item("Electrolyzer gigafactory breaks ground", "");
        let kept = dedup.deduplicate(&[a.clone(), a.clone()]);
        assert_eq!(kept.len(), 2);

        // Just below 1.0 the identical pair collapses.
        let dedup = Deduplicator::with_threshold(0.999);
        let kept = dedup.deduplicate(&[a.clone(), a]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_recency_tie_break() {
        let dedup = Deduplicator::default();
        let mut jan = item("Hydrogen terminal deal signed with Japan", "");
        jan.published_at = Some("2024-01-01T00:00:00Z".to_string());
        let mut jun = jan.clone();
        jun.published_at = Some("2024-06-01T00:00:00Z".to_string());
        let mut undated = jan.clone();
        undated.published_at = None;

        let kept = dedup.deduplicate(&[jan, jun.clone(), undated]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].published_at, jun.published_at);
    }

    #[test]
    fn test_unparsable_timestamp_falls_back_to_first() {
        let dedup = Deduplicator::default();
        let mut a = item("Ammonia import terminal gets permit", "");
        a.published_at = Some("not-a-date".to_string());
        let mut b = a.clone();
        b.published_at = None;

        let kept = dedup.deduplicate(&[a.clone(), b]);
        assert_eq!(kept.len(), 1);
        // No parseable timestamp in the cluster: the earliest member stays.
        assert_eq!(kept[0].published_at, a.published_at);
    }

    #[test]
    fn test_idempotence() {
        let dedup = Deduplicator::default();
        let mut early = item("Steel plant switches to hydrogen DRI", "Pilot phase");
        early.published_at = Some("2024-02-01T00:00:00Z".to_string());
        let mut late = early.clone();
        late.published_at = Some("2024-03-01T00:00:00Z".to_string());
        let batch = vec![
            early,
            late,
            item("Offshore wind to power electrolyzers", "North Sea tender"),
        ];

        let once = dedup.deduplicate(&batch);
        let twice = dedup.deduplicate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fallback_partitions_by_url() {
        let dedup = Deduplicator::default();
        // Every combined text is empty, so vectorization is unavailable.
        let batch = vec![url_only("a"), url_only("b"), url_only("a")];
        let kept = dedup.deduplicate(&batch);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].url.as_deref(), Some("a"));
        assert_eq!(kept[1].url.as_deref(), Some("b"));
    }

    #[test]
    fn test_fallback_collapses_missing_urls() {
        let dedup = Deduplicator::default();
        let batch = vec![NewsItem::default(), NewsItem::default(), url_only("a")];
        let kept = dedup.deduplicate(&batch);
        // Known coarse behavior: url-less items share one key.
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_input_batch_is_untouched() {
        let dedup = Deduplicator::default();
        let a = item("Electrolyzer order book doubles", "");
        let batch = vec![a.clone(), a.clone()];
        let before = batch.clone();
        let _ = dedup.deduplicate(&batch);
        assert_eq!(batch, before);
    }
}
