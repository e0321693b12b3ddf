use std::path::PathBuf;

use crate::error::StoreError;
use crate::feed::Chapter;
use crate::podcast::{Podcast, CACHE_FILENAME, LATEST_FILENAME, PARTIAL_SUFFIX};

/// Read the cached remote chapters, newest-first as the feed listed them.
///
/// A podcast that has never been synchronized has no cache file; that is
/// reported as an empty sequence, not an error, so `list` works before
/// the first sync.
pub fn remote_chapters(podcast: &Podcast) -> Result<Vec<Chapter>, StoreError> {
    let path = podcast.cache_path();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::CacheReadFailed {
        path: path.clone(),
        source: e,
    })?;
    serde_json::from_str(&contents).map_err(|e| StoreError::CacheParseFailed { path, source: e })
}

/// Overwrite the cache file with a new chapter sequence
pub fn write_cache(podcast: &Podcast, chapters: &[Chapter]) -> Result<(), StoreError> {
    let path = podcast.cache_path();
    let json = serde_json::to_string(chapters).map_err(StoreError::CacheSerializeFailed)?;
    std::fs::write(&path, json).map_err(|e| StoreError::CacheWriteFailed { path, source: e })
}

/// List the fetched media files in the podcast's media directory.
///
/// Control files (`.cache`, `.latest`) and partial downloads are excluded.
/// Order is directory enumeration order; callers needing determinism must
/// sort themselves.
pub fn fetched_chapters(podcast: &Podcast) -> Result<Vec<PathBuf>, StoreError> {
    let entries =
        std::fs::read_dir(&podcast.media_dir).map_err(|e| StoreError::ReadDirectoryFailed {
            path: podcast.media_dir.clone(),
            source: e,
        })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::ReadDirectoryFailed {
            path: podcast.media_dir.clone(),
            source: e,
        })?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name == CACHE_FILENAME || name == LATEST_FILENAME || name.ends_with(PARTIAL_SUFFIX) {
            continue;
        }
        files.push(entry.path());
    }
    Ok(files)
}

/// Resolve a 1-based chapter index against the remote cache
pub fn resolve_remote(podcast: &Podcast, index: usize) -> Result<Chapter, StoreError> {
    let chapters = remote_chapters(podcast)?;
    pick(chapters, index)
}

/// Resolve a 1-based chapter index against the fetched files
pub fn resolve_fetched(podcast: &Podcast, index: usize) -> Result<PathBuf, StoreError> {
    let files = fetched_chapters(podcast)?;
    pick(files, index)
}

// Indexes are 1-based on the CLI; 0 and out-of-range are rejected,
// never clamped or wrapped.
fn pick<T>(mut items: Vec<T>, index: usize) -> Result<T, StoreError> {
    if index == 0 || index > items.len() {
        return Err(StoreError::InvalidChapter { index });
    }
    Ok(items.swap_remove(index - 1))
}
