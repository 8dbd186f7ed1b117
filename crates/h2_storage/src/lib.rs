pub mod backends;

pub use backends::memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use backends::sqlite::SqliteStore;

pub mod prelude {
    pub use super::backends::memory::MemoryStore;
    #[cfg(feature = "sqlite")]
    pub use super::backends::sqlite::SqliteStore;
    pub use h2_core::{Result, SeenStore, SubscriberStore};
}
