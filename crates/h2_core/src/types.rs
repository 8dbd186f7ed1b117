use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One candidate news entry as produced by a source fetcher.
///
/// No field is guaranteed to be present. `published_at` is carried as the
/// ISO-8601 text the upstream handed us and only parsed when a comparison
/// needs it, so a malformed date never poisons the item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
}

impl NewsItem {
    /// Title and summary joined with a space, absent summary as empty.
    /// This is the text every comparison and classification runs over.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.summary.as_deref().unwrap_or(""))
    }

    /// Lenient timestamp parse. Unparsable or absent dates are `None`.
    pub fn published_ts(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// URL with absence collapsed to the empty string, the key the
    /// fallback deduplication path partitions on.
    pub fn url_key(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}
