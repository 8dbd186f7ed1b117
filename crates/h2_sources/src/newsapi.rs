use async_trait::async_trait;
use h2_core::{NewsItem, Result, SourceFetcher};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<ApiSource>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl From<ApiArticle> for NewsItem {
    fn from(article: ApiArticle) -> Self {
        NewsItem {
            title: article.title.unwrap_or_default(),
            summary: article.description,
            url: article.url,
            published_at: article.published_at,
            company: None,
            source: article.source.and_then(|s| s.name),
        }
    }
}

/// Keyword search against the NewsAPI "everything" endpoint. Without an
/// API key the fetcher is a silent no-op, mirroring the degraded mode the
/// rest of the pipeline expects.
pub struct NewsApiFetcher {
    client: reqwest::Client,
    api_key: Option<String>,
    page_size: usize,
}

impl NewsApiFetcher {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

#[async_trait]
impl SourceFetcher for NewsApiFetcher {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<NewsItem>> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("no NewsAPI key configured, skipping");
            return Ok(Vec::new());
        };

        let page_size = self.page_size.to_string();
        let response = self
            .client
            .get(NEWSAPI_URL)
            .query(&[
                ("q", query),
                ("pageSize", page_size.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("apiKey", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "NewsAPI request failed");
            return Ok(Vec::new());
        }

        let body = response.json::<EverythingResponse>().await?;
        Ok(body.articles.into_iter().map(NewsItem::from).collect())
    }
}
