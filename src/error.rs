use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while loading or validating the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing config file {path}: a commented template has been written, edit it and re-run")]
    TemplateCreated { path: PathBuf },

    #[error("failed to write config template to {path}: {source}")]
    TemplateWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing or empty config option: config.{key}")]
    MissingKey { key: &'static str },

    #[error("feed URL for podcast '{id}' is not a string")]
    InvalidFeedValue { id: String },

    #[error("invalid podcast id: {id}")]
    UnknownPodcast { id: String },

    #[error("cannot determine home directory to expand '~' in {value}")]
    HomeDirUnavailable { value: String },
}

/// Errors raised while retrieving or parsing a podcast feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to fetch feed from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read feed file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse RSS feed: {0}")]
    ParseFailed(#[from] rss::Error),
}

/// Errors raised by the per-podcast chapter store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create media directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load cache {path}: {source}")]
    CacheReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse cache {path}: {source}")]
    CacheParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to save cache {path}: {source}")]
    CacheWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize cache: {0}")]
    CacheSerializeFailed(#[source] serde_json::Error),

    #[error("failed to read media directory {path}: {source}")]
    ReadDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid chapter identifier: {index}")]
    InvalidChapter { index: usize },
}

/// Errors raised by the latest-pointer symlink
#[derive(Error, Debug)]
pub enum LatestError {
    #[error("no podcast file registered as latest")]
    NoLatest,

    #[error("broken latest pointer: {link} -> {target}")]
    Broken { link: PathBuf, target: PathBuf },

    #[error("failed to read latest pointer {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to update latest pointer {path}: {source}")]
    UpdateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to convert old-style LATEST file {path} to a symlink: {source}")]
    MigrationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while fetching a chapter through the external downloader
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("chapter URL has no usable file name: {url}")]
    UnusableUrl { url: String },

    #[error("failed to run download command '{command}': {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download the file ({url}): {status}")]
    DownloadFailed { url: String, status: ExitStatus },

    #[error("failed to save the file ({path}): {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no chapters available")]
    NoChapters,

    #[error("no newer chapter available")]
    NothingNew,
}

/// Errors raised while playing a fetched chapter
#[derive(Error, Debug)]
pub enum PlayError {
    #[error("failed to run player command '{command}': {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to play the file ({path}): {status}")]
    PlaybackFailed { path: PathBuf, status: ExitStatus },

    #[error("no fetched chapters available")]
    NoChapters,
}

/// Top-level error, produced at the command-dispatch boundary
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Latest(#[from] LatestError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Play(#[from] PlayError),
}
