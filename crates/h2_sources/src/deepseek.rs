use async_trait::async_trait;
use h2_core::{Error, NewsItem, Result, SourceFetcher};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Asks the DeepSeek chat API to summarize recent news for a prompt and
/// parses the reply into items. The model is instructed elsewhere to emit
/// blocks of title / summary / source-URL lines; blocks that don't fit
/// that shape are skipped.
pub struct DeepSeekFetcher {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl DeepSeekFetcher {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl SourceFetcher for DeepSeekFetcher {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn fetch(&self, prompt: &str) -> Result<Vec<NewsItem>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.7,
            max_tokens: 500,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Fetch("empty completion response".to_string()))?;

        let items = parse_items(&content);
        debug!(count = items.len(), "completion parsed");
        Ok(items)
    }
}

/// Split a completion into double-newline blocks and read each as
/// title / summary / URL. The URL line only counts when it looks like one.
fn parse_items(content: &str) -> Vec<NewsItem> {
    content
        .split("\n\n")
        .filter_map(|block| {
            let lines: Vec<&str> = block.lines().collect();
            if lines.len() < 3 {
                return None;
            }
            let url = lines[2].trim();
            Some(NewsItem {
                title: lines[0].replace("**", "").trim().to_string(),
                summary: Some(lines[1].trim().to_string()),
                url: url.starts_with("http").then(|| url.to_string()),
                published_at: None,
                company: None,
                source: Some("deepseek".to_string()),
            })
        })
        .collect()
}
