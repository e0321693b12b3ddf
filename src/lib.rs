pub mod command;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod latest;
pub mod player;
pub mod podcast;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{ConfigError, Error, FeedError, FetchError, LatestError, PlayError, StoreError};
pub use feed::{parse_chapters, synchronize, synchronize_all, Chapter, SyncReport};
pub use fetcher::{fetch, fetch_all, fetch_latest, ChapterRef, FetchReport};
pub use player::{play, play_latest, play_random, PlayTarget};
pub use podcast::Podcast;
