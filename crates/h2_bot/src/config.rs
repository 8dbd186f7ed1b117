use std::path::Path;

use h2_core::{Error, Result};
use h2_dedup::DEFAULT_THRESHOLD;
use serde::Deserialize;
use tracing::warn;

/// Bot configuration, read once at startup and passed down by reference.
/// Secrets stay in environment variables; this file holds the rest.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Ordered keyword list for topic classification.
    pub keywords: Vec<String>,
    /// Press-release RSS feeds polled by /announcements.
    pub rss_feeds: Vec<String>,
    /// Companies covered by /companies.
    pub companies: Vec<String>,
    /// Similarity threshold for deduplication.
    pub threshold: f32,
    pub feed_limit: usize,
    pub digest_limit: usize,
    pub company_limit: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                "H2".to_string(),
                "Ammonia".to_string(),
                "Electrolyzer".to_string(),
                "Fuel cell".to_string(),
                "Investment".to_string(),
            ],
            rss_feeds: Vec::new(),
            companies: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
            feed_limit: 6,
            digest_limit: 5,
            company_limit: 15,
        }
    }
}

impl BotConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the config file, or fall back to defaults when it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
