use async_trait::async_trait;
use chrono::{DateTime, Utc};
use h2_core::{Error, NewsItem, Result, SourceFetcher};
use rss::Channel;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_MAX_ITEMS: usize = 8;

/// Fetches press-release announcements from a configured list of RSS
/// feeds. The query argument of [`SourceFetcher::fetch`] is ignored; the
/// feed list is fixed at construction.
pub struct RssFetcher {
    client: reqwest::Client,
    feeds: Vec<String>,
    max_items_per_feed: usize,
}

impl RssFetcher {
    pub fn new(feeds: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            feeds,
            max_items_per_feed: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn with_max_items(mut self, max_items_per_feed: usize) -> Self {
        self.max_items_per_feed = max_items_per_feed;
        self
    }

    async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<NewsItem>> {
        let response = self.client.get(feed_url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "feed {} returned status {}",
                feed_url,
                response.status()
            )));
        }
        let bytes = response.bytes().await?;
        let channel = Channel::read_from(&bytes[..])
            .map_err(|e| Error::Fetch(format!("failed to parse feed {}: {}", feed_url, e)))?;
        Ok(items_from_channel(&channel, feed_url, self.max_items_per_feed))
    }
}

#[async_trait]
impl SourceFetcher for RssFetcher {
    fn name(&self) -> &str {
        "rss"
    }

    async fn fetch(&self, _query: &str) -> Result<Vec<NewsItem>> {
        let mut items = Vec::new();
        for feed_url in &self.feeds {
            match self.fetch_feed(feed_url).await {
                Ok(mut feed_items) => {
                    debug!(feed = feed_url, count = feed_items.len(), "feed fetched");
                    items.append(&mut feed_items);
                }
                Err(e) => warn!("error parsing feed {}: {}", feed_url, e),
            }
        }
        Ok(items)
    }
}

fn items_from_channel(channel: &Channel, feed_url: &str, max_items: usize) -> Vec<NewsItem> {
    channel
        .items()
        .iter()
        .take(max_items)
        .map(|item| NewsItem {
            title: collapse_whitespace(item.title().unwrap_or("")),
            summary: strip_html(item.description().unwrap_or("")),
            url: item.link().map(|l| l.to_string()),
            published_at: item
                .pub_date()
                .and_then(parse_feed_date)
                .map(|dt| dt.to_rfc3339()),
            company: None,
            source: Some(feed_url.to_string()),
        })
        .collect()
}

/// Feeds carry RFC 2822 dates in the wild, RFC 3339 occasionally.
fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Drop markup from a feed description, keeping the visible text with
/// whitespace collapsed. Empty results become `None`.
fn strip_html(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    let cleaned = collapse_whitespace(&text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
