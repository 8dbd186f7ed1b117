pub mod error;
pub mod fetch;
pub mod sink;
pub mod storage;
pub mod types;

pub use error::Error;
pub use fetch::SourceFetcher;
pub use sink::MessageSink;
pub use storage::{SeenStore, SubscriberStore};
pub use types::NewsItem;

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::fetch::SourceFetcher;
    pub use super::sink::MessageSink;
    pub use super::storage::{SeenStore, SubscriberStore};
    pub use super::{Error, NewsItem, Result};
}
