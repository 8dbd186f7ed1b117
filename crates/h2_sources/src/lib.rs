pub mod deepseek;
pub mod feeds;
pub mod manager;
pub mod newsapi;

pub use deepseek::DeepSeekFetcher;
pub use feeds::RssFetcher;
pub use manager::FetcherSet;
pub use newsapi::NewsApiFetcher;

pub mod prelude {
    pub use super::{DeepSeekFetcher, FetcherSet, NewsApiFetcher, RssFetcher};
    pub use h2_core::{Error, NewsItem, Result, SourceFetcher};
}
