use h2_core::{MessageSink, NewsItem, Result};
use h2_dedup::classify_by_keywords;
use tracing::warn;

pub fn format_item(item: &NewsItem, topics: &[String]) -> String {
    let title = if item.title.is_empty() {
        "No title"
    } else {
        item.title.as_str()
    };
    format!(
        "📰 {}\n{}\n{}\n{}",
        title,
        topics.join(", "),
        item.summary.as_deref().unwrap_or(""),
        item.url.as_deref().unwrap_or("")
    )
}

pub fn format_company_item(item: &NewsItem) -> String {
    format!(
        "🏭 {}\n{}\n{}\n{}",
        item.company.as_deref().unwrap_or(""),
        item.title,
        item.summary.as_deref().unwrap_or(""),
        item.url.as_deref().unwrap_or("")
    )
}

/// Classify and deliver up to `limit` items, one message each. A failed
/// send is logged and the rest of the list still goes out.
pub async fn send_list(
    sink: &dyn MessageSink,
    chat_id: i64,
    items: &[NewsItem],
    limit: usize,
    keywords: &[String],
) -> Result<()> {
    if items.is_empty() {
        sink.send_message(chat_id, "No items found.").await?;
        return Ok(());
    }
    for item in items.iter().take(limit) {
        let topics = classify_by_keywords(&item.combined_text(), keywords);
        let text = format_item(item, &topics);
        if let Err(e) = sink.send_message(chat_id, &text).await {
            warn!("error sending message to {}: {}", chat_id, e);
        }
    }
    Ok(())
}

/// Same delivery loop with the company-first layout used by /companies.
pub async fn send_company_list(
    sink: &dyn MessageSink,
    chat_id: i64,
    items: &[NewsItem],
    limit: usize,
) -> Result<()> {
    for item in items.iter().take(limit) {
        if let Err(e) = sink.send_message(chat_id, &format_company_item(item)).await {
            warn!("error sending message to {}: {}", chat_id, e);
        }
    }
    Ok(())
}
