use std::path::PathBuf;

use crate::config::Config;
use crate::error::StoreError;

/// Hidden JSON cache of remote chapters
pub const CACHE_FILENAME: &str = ".cache";
/// Hidden symlink pointing at the most recently fetched file
pub const LATEST_FILENAME: &str = ".latest";
/// Old plain-text pointer file, migrated to the symlink on sight
pub const LEGACY_LATEST_FILENAME: &str = "LATEST";
/// Suffix for in-progress downloads
pub const PARTIAL_SUFFIX: &str = ".part";

/// One configured podcast and its on-disk layout.
///
/// The media directory and the two control files inside it are the only
/// durable state this program keeps.
#[derive(Debug, Clone)]
pub struct Podcast {
    pub id: String,
    pub feed_url: String,
    pub media_dir: PathBuf,
}

impl Podcast {
    /// Look up a podcast id in the configuration and create its media
    /// directory if it does not exist yet.
    pub fn open(config: &Config, id: &str) -> Result<Podcast, crate::Error> {
        let feed_url = config.feed_url(id)?.to_string();
        let media_dir = config.media_dir.join(id);
        if !media_dir.exists() {
            std::fs::create_dir_all(&media_dir).map_err(|e| StoreError::CreateDirectoryFailed {
                path: media_dir.clone(),
                source: e,
            })?;
        }
        Ok(Podcast {
            id: id.to_string(),
            feed_url,
            media_dir,
        })
    }

    pub fn cache_path(&self) -> PathBuf {
        self.media_dir.join(CACHE_FILENAME)
    }

    pub fn latest_path(&self) -> PathBuf {
        self.media_dir.join(LATEST_FILENAME)
    }

    pub fn legacy_latest_path(&self) -> PathBuf {
        self.media_dir.join(LEGACY_LATEST_FILENAME)
    }
}

// Allow tests elsewhere in the crate to build a podcast rooted in a tempdir.
#[cfg(test)]
pub(crate) fn test_podcast(media_dir: &std::path::Path) -> Podcast {
    Podcast {
        id: "test".to_string(),
        feed_url: "https://example.org/feed.xml".to_string(),
        media_dir: media_dir.to_path_buf(),
    }
}
