use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver formatted text to a destination chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}
