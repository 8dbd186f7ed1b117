use std::sync::Arc;

use h2_core::{MessageSink, NewsItem, Result, SourceFetcher, SubscriberStore};
use h2_dedup::Deduplicator;
use h2_sources::FetcherSet;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::format::{send_company_list, send_list};

const HELP_TEXT: &str = "👋 Hello! I am H2 Hydrogen Bot.\n\n\
Commands:\n\
/feed - latest hydrogen news\n\
/announcements - latest press releases from RSS\n\
/company <name> - news about a company\n\
/companies - news from configured companies\n\
/topic <keyword> - news about a topic\n\
/subscribe - daily digest\n\
/unsubscribe - stop digest\n";

pub const FEED_PROMPT: &str = "Summarize the latest hydrogen news (H2, ammonia, electrolyzer, \
fuel cell). Provide 6 items, each with a title, summary, and source URL.";

pub const DIGEST_PROMPT: &str = "Summarize today's hydrogen news (H2, ammonia, electrolyzer, \
fuel cell, investment). Provide 5 items, each with a title, summary, and source URL.";

fn company_prompt(company: &str, count: usize) -> String {
    format!(
        "Summarize the latest hydrogen-related news for {}. Provide {} items, \
each with a title, summary, and source URL.",
        company, count
    )
}

fn topic_prompt(topic: &str) -> String {
    format!(
        "Summarize the latest hydrogen-related news on {}. Provide 6 items, \
each with a title, summary, and source URL.",
        topic
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Feed,
    Announcements,
    Company(Option<String>),
    Companies,
    Topic(Option<String>),
    Subscribe,
    Unsubscribe,
}

impl Command {
    /// Decode a message text into a command. Non-command chatter and
    /// unknown commands are `None` and get ignored upstream.
    pub fn parse(text: &str) -> Option<Command> {
        let trimmed = text.trim();
        if !trimmed.starts_with('/') {
            return None;
        }
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let head = parts.next()?;
        // Group chats address commands as /feed@botname.
        let head = head.split('@').next().unwrap_or(head);
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        match head {
            "/start" => Some(Command::Start),
            "/feed" => Some(Command::Feed),
            "/announcements" => Some(Command::Announcements),
            "/company" => Some(Command::Company(arg)),
            "/companies" => Some(Command::Companies),
            "/topic" => Some(Command::Topic(arg)),
            "/subscribe" => Some(Command::Subscribe),
            "/unsubscribe" => Some(Command::Unsubscribe),
            _ => None,
        }
    }
}

/// Wires one incoming command through fetch, dedup, classification and
/// delivery. Holds only shared handles, so it is cheap to clone into the
/// polling and digest tasks.
pub struct Dispatcher {
    sink: Arc<dyn MessageSink>,
    subscribers: Arc<dyn SubscriberStore>,
    llm: Arc<dyn SourceFetcher>,
    announcements: Arc<dyn SourceFetcher>,
    topic_sources: FetcherSet,
    dedup: Deduplicator,
    config: BotConfig,
}

impl Dispatcher {
    pub fn new(
        sink: Arc<dyn MessageSink>,
        subscribers: Arc<dyn SubscriberStore>,
        llm: Arc<dyn SourceFetcher>,
        announcements: Arc<dyn SourceFetcher>,
        topic_sources: FetcherSet,
        dedup: Deduplicator,
        config: BotConfig,
    ) -> Self {
        Self {
            sink,
            subscribers,
            llm,
            announcements,
            topic_sources,
            dedup,
            config,
        }
    }

    pub async fn handle_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let Some(command) = Command::parse(text) else {
            return Ok(());
        };
        info!(chat_id, ?command, "handling command");

        match command {
            Command::Start => self.sink.send_message(chat_id, HELP_TEXT).await,
            Command::Feed => self.cmd_feed(chat_id).await,
            Command::Announcements => self.cmd_announcements(chat_id).await,
            Command::Company(None) => self.sink.send_message(chat_id, "Usage: /company Linde").await,
            Command::Company(Some(name)) => self.cmd_company(chat_id, &name).await,
            Command::Companies => self.cmd_companies(chat_id).await,
            Command::Topic(None) => {
                self.sink
                    .send_message(chat_id, "Usage: /topic Electrolyzer")
                    .await
            }
            Command::Topic(Some(topic)) => self.cmd_topic(chat_id, &topic).await,
            Command::Subscribe => {
                self.subscribers.add_subscriber(chat_id).await?;
                self.sink
                    .send_message(chat_id, "✅ Subscribed to daily digest.")
                    .await
            }
            Command::Unsubscribe => {
                self.subscribers.remove_subscriber(chat_id).await?;
                self.sink.send_message(chat_id, "❌ Unsubscribed.").await
            }
        }
    }

    /// Fetch from one source, tolerating failure as an empty batch.
    async fn fetch_lenient(&self, fetcher: &dyn SourceFetcher, query: &str) -> Vec<NewsItem> {
        match fetcher.fetch(query).await {
            Ok(items) => items,
            Err(e) => {
                warn!("source {} failed: {}", fetcher.name(), e);
                Vec::new()
            }
        }
    }

    async fn cmd_feed(&self, chat_id: i64) -> Result<()> {
        self.sink
            .send_message(chat_id, "Fetching latest news...")
            .await?;
        let items = self.fetch_lenient(self.llm.as_ref(), FEED_PROMPT).await;
        let items = self.dedup.deduplicate(&items);
        send_list(
            self.sink.as_ref(),
            chat_id,
            &items,
            self.config.feed_limit,
            &self.config.keywords,
        )
        .await
    }

    async fn cmd_announcements(&self, chat_id: i64) -> Result<()> {
        self.sink
            .send_message(chat_id, "Fetching RSS announcements...")
            .await?;
        let items = self.fetch_lenient(self.announcements.as_ref(), "").await;
        let items = self.dedup.deduplicate(&items);
        info!(count = items.len(), "RSS feed results");
        send_list(
            self.sink.as_ref(),
            chat_id,
            &items,
            self.config.feed_limit,
            &self.config.keywords,
        )
        .await
    }

    async fn cmd_company(&self, chat_id: i64, company: &str) -> Result<()> {
        self.sink
            .send_message(chat_id, &format!("Searching news for {}...", company))
            .await?;
        let items = self
            .fetch_lenient(self.llm.as_ref(), &company_prompt(company, 6))
            .await;
        let items = self.dedup.deduplicate(&items);
        send_list(
            self.sink.as_ref(),
            chat_id,
            &items,
            self.config.feed_limit,
            &self.config.keywords,
        )
        .await
    }

    async fn cmd_companies(&self, chat_id: i64) -> Result<()> {
        if self.config.companies.is_empty() {
            return self.sink.send_message(chat_id, "No companies configured.").await;
        }
        self.sink
            .send_message(chat_id, "📡 Fetching latest company news...")
            .await?;

        let mut all_items = Vec::new();
        for company in &self.config.companies {
            let mut items = self
                .fetch_lenient(self.llm.as_ref(), &company_prompt(company, 3))
                .await;
            for item in &mut items {
                item.company = Some(company.clone());
            }
            all_items.append(&mut items);
        }

        let all_items = self.dedup.deduplicate(&all_items);
        if all_items.is_empty() {
            return self
                .sink
                .send_message(chat_id, "No recent company news found.")
                .await;
        }
        send_company_list(
            self.sink.as_ref(),
            chat_id,
            &all_items,
            self.config.company_limit,
        )
        .await
    }

    async fn cmd_topic(&self, chat_id: i64, topic: &str) -> Result<()> {
        self.sink
            .send_message(chat_id, &format!("Searching news for {}...", topic))
            .await?;
        // Topic searches merge the LLM summary with the search API; the
        // batch order stays fetcher-registration order.
        let items = self.topic_sources.fetch_all(&topic_prompt(topic)).await;
        let items = self.dedup.deduplicate(&items);
        send_list(
            self.sink.as_ref(),
            chat_id,
            &items,
            self.config.feed_limit,
            &self.config.keywords,
        )
        .await
    }

    /// Build today's digest once and deliver it to every subscriber.
    pub async fn run_digest(&self) -> Result<()> {
        let subscribers = self.subscribers.list_subscribers().await?;
        if subscribers.is_empty() {
            info!("no subscribers, skipping digest");
            return Ok(());
        }

        let items = self.fetch_lenient(self.llm.as_ref(), DIGEST_PROMPT).await;
        let items = self.dedup.deduplicate(&items);
        info!(
            subscribers = subscribers.len(),
            items = items.len(),
            "sending digest"
        );
        for chat_id in subscribers {
            if let Err(e) = send_list(
                self.sink.as_ref(),
                chat_id,
                &items,
                self.config.digest_limit,
                &self.config.keywords,
            )
            .await
            {
                warn!("error sending digest to {}: {}", chat_id, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::test_support::RecordingSink;
    use async_trait::async_trait;
    use h2_storage::MemoryStore;

    struct FixedFetcher {
        items: Vec<NewsItem>,
    }

    #[async_trait]
    impl SourceFetcher for FixedFetcher {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, _query: &str) -> Result<Vec<NewsItem>> {
            Ok(self.items.clone())
        }
    }

    fn news(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: Some("H2 update".to_string()),
            ..Default::default()
        }
    }

    fn dispatcher_with(sink: Arc<RecordingSink>, items: Vec<NewsItem>) -> Dispatcher {
        let llm = Arc::new(FixedFetcher {
            items: items.clone(),
        });
        let mut topic_sources = FetcherSet::new();
        topic_sources.add_fetcher(llm.clone());
        Dispatcher::new(
            sink,
            Arc::new(MemoryStore::new()),
            llm.clone(),
            Arc::new(FixedFetcher { items }),
            topic_sources,
            Deduplicator::default(),
            BotConfig::default(),
        )
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("/feed"), Some(Command::Feed));
        assert_eq!(Command::parse("/feed@h2bot"), Some(Command::Feed));
        assert_eq!(
            Command::parse("/company Linde"),
            Some(Command::Company(Some("Linde".to_string())))
        );
        assert_eq!(Command::parse("/company"), Some(Command::Company(None)));
        assert_eq!(Command::parse("/topic  "), Some(Command::Topic(None)));
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        let sink = Arc::new(RecordingSink::default());
        let store = Arc::new(MemoryStore::new());
        let llm = Arc::new(FixedFetcher { items: vec![] });
        let dispatcher = Dispatcher::new(
            sink.clone(),
            store.clone(),
            llm.clone(),
            llm.clone(),
            FetcherSet::new(),
            Deduplicator::default(),
            BotConfig::default(),
        );

        dispatcher.handle_message(42, "/subscribe").await.unwrap();
        assert_eq!(store.list_subscribers().await.unwrap(), vec![42]);

        dispatcher.handle_message(42, "/unsubscribe").await.unwrap();
        assert!(store.list_subscribers().await.unwrap().is_empty());

        let sent = sink.sent.lock().await;
        assert_eq!(sent[0].1, "✅ Subscribed to daily digest.");
        assert_eq!(sent[1].1, "❌ Unsubscribed.");
    }

    #[tokio::test]
    async fn test_feed_deduplicates_before_sending() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher_with(
            sink.clone(),
            vec![
                news("Electrolyzer gigafactory announced in Spain"),
                news("Electrolyzer gigafactory announced in Spain"),
                news("Ammonia carrier completes maiden voyage"),
            ],
        );

        dispatcher.handle_message(7, "/feed").await.unwrap();

        let sent = sink.sent.lock().await;
        // Status line plus one message per surviving item.
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].1, "Fetching latest news...");
        assert!(sent[1].1.contains("Electrolyzer gigafactory"));
        assert!(sent[2].1.contains("Ammonia carrier"));
    }

    #[tokio::test]
    async fn test_company_requires_argument() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher_with(sink.clone(), vec![]);

        dispatcher.handle_message(7, "/company").await.unwrap();
        let sent = sink.sent.lock().await;
        assert_eq!(sent[0].1, "Usage: /company Linde");
    }

    #[tokio::test]
    async fn test_digest_goes_to_all_subscribers() {
        let sink = Arc::new(RecordingSink::default());
        let store = Arc::new(MemoryStore::new());
        store.add_subscriber(1).await.unwrap();
        store.add_subscriber(2).await.unwrap();

        let llm = Arc::new(FixedFetcher {
            items: vec![news("Hydrogen corridor funding approved")],
        });
        let dispatcher = Dispatcher::new(
            sink.clone(),
            store,
            llm.clone(),
            llm.clone(),
            FetcherSet::new(),
            Deduplicator::default(),
            BotConfig::default(),
        );

        dispatcher.run_digest().await.unwrap();

        let sent = sink.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, 1);
        assert_eq!(sent[1].0, 2);
    }

    #[tokio::test]
    async fn test_ignores_chatter() {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher = dispatcher_with(sink.clone(), vec![]);
        dispatcher.handle_message(7, "what's new?").await.unwrap();
        assert!(sink.sent.lock().await.is_empty());
    }
}
