mod commands;
mod config;
mod digest;
mod format;
mod telegram;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use h2_core::{Error, Result, SubscriberStore};
use h2_dedup::{DedupConfig, Deduplicator};
use h2_sources::{DeepSeekFetcher, FetcherSet, NewsApiFetcher, RssFetcher};
use h2_storage::MemoryStore;
use tracing::{info, warn};

use commands::Dispatcher;
use config::BotConfig;
use telegram::TelegramApi;

const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number means seconds.
        if !current_number.is_empty() {
            if let Ok(num) = current_number.parse::<u64>() {
                total_seconds += num;
                has_unit = true;
            } else {
                return Err("Invalid number in duration".to_string());
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the bot configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    #[arg(long, default_value = "memory", help = "Storage backend: memory or sqlite")]
    storage: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Poll for commands and send the digest on a schedule
    Run {
        /// Digest interval (e.g. 24h, 30m, 1h15m30s)
        #[arg(long, default_value = "24h")]
        digest_interval: HumanDuration,
    },
    /// Build and send one digest to all subscribers, then exit
    Digest,
}

async fn build_store(backend: &str) -> Result<Arc<dyn SubscriberStore>> {
    match backend {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(h2_storage::SqliteStore::new().await?)),
        other => Err(Error::Config(format!("unknown storage backend: {}", other))),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = BotConfig::load_or_default(&cli.config)?;

    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .map_err(|_| Error::Config("Set TELEGRAM_BOT_TOKEN in environment".to_string()))?;
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY")
        .map_err(|_| Error::Config("Set DEEPSEEK_API_KEY in environment".to_string()))?;
    let newsapi_key = std::env::var("NEWSAPI_KEY").ok();

    let subscribers = build_store(&cli.storage).await?;
    info!("💾 Subscriber store initialized (using {})", cli.storage);

    let api = Arc::new(TelegramApi::new(token));
    let llm = Arc::new(DeepSeekFetcher::new(deepseek_key));
    let announcements = Arc::new(RssFetcher::new(config.rss_feeds.clone()));

    let mut topic_sources = FetcherSet::new();
    topic_sources.add_fetcher(llm.clone());
    topic_sources.add_fetcher(Arc::new(NewsApiFetcher::new(newsapi_key)));

    let dedup = Deduplicator::new(DedupConfig {
        threshold: config.threshold,
        ..DedupConfig::default()
    });

    let dispatcher = Arc::new(Dispatcher::new(
        api.clone(),
        subscribers,
        llm,
        announcements,
        topic_sources,
        dedup,
        config,
    ));

    match cli.command {
        Commands::Digest => dispatcher.run_digest().await,
        Commands::Run { digest_interval } => {
            info!("🤖 Bot started, polling for updates");
            tokio::spawn(digest::digest_loop(dispatcher.clone(), digest_interval.0));

            let mut offset = 0i64;
            loop {
                match api.get_updates(offset, POLL_TIMEOUT_SECS).await {
                    Ok(updates) => {
                        for update in updates {
                            offset = update.update_id + 1;
                            let Some(message) = update.message else { continue };
                            let Some(text) = message.text else { continue };
                            if let Err(e) = dispatcher.handle_message(message.chat.id, &text).await
                            {
                                warn!("error handling command from {}: {}", message.chat.id, e);
                            }
                        }
                    }
                    Err(e) => {
                        warn!("getUpdates failed: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }
}
