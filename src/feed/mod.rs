// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod fetch;
mod parse;

pub use fetch::{fetch_feed_bytes, is_url, load_feed_source, read_feed_file};
pub use parse::{parse_chapters, Chapter};

use log::debug;

use crate::config::Config;
use crate::error::Error;
use crate::latest;
use crate::podcast::Podcast;
use crate::store;

/// Refresh a podcast's local chapter cache from its feed.
///
/// The cache is fully overwritten with the sequence of qualifying
/// enclosures, in feed order. A legacy `LATEST` pointer file is migrated
/// to the symlink format before syncing. Returns the number of chapters
/// now in the cache.
pub fn synchronize(podcast: &Podcast) -> Result<usize, Error> {
    latest::migrate_legacy(podcast)?;

    debug!("fetching feed for {:?} from {}", podcast.id, podcast.feed_url);
    let bytes = load_feed_source(&podcast.feed_url)?;
    let chapters = parse_chapters(&bytes)?;
    debug!("feed for {:?} lists {} chapters", podcast.id, chapters.len());

    store::write_cache(podcast, &chapters)?;
    Ok(chapters.len())
}

/// Outcome of synchronizing every configured podcast
#[derive(Debug)]
pub struct SyncReport {
    /// Podcast id and chapter count, for each feed that synchronized
    pub synced: Vec<(String, usize)>,
    /// Podcast id and error, for each feed that did not
    pub failed: Vec<(String, Error)>,
}

/// Synchronize every configured podcast, in configuration order.
///
/// A failing feed does not stop the remaining ones; each podcast is
/// attempted exactly once and failures are collected per id so the
/// caller can report them after the whole run.
pub fn synchronize_all(config: &Config) -> SyncReport {
    let mut synced = Vec::new();
    let mut failed = Vec::new();
    for (id, _) in config.feeds() {
        let result = Podcast::open(config, id).and_then(|podcast| synchronize(&podcast));
        match result {
            Ok(count) => synced.push((id.clone(), count)),
            Err(e) => failed.push((id.clone(), e)),
        }
    }
    SyncReport { synced, failed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::podcast::test_podcast;
    use tempfile::tempdir;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <description>Test</description>
    <item>
      <title>Newest</title>
      <enclosure url="https://example.org/c.mp3" length="3" type="audio/mpeg"/>
    </item>
    <item>
      <title>Older</title>
      <enclosure url="https://example.org/b.mp3" length="2" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    const REPLACEMENT_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <description>Test</description>
    <item>
      <title>Only one</title>
      <enclosure url="https://example.org/z.mp3" length="1" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    fn podcast_with_feed(dir: &std::path::Path, feed_xml: &str) -> Podcast {
        let feed_path = dir.join("feed.xml");
        std::fs::write(&feed_path, feed_xml).unwrap();
        let mut podcast = test_podcast(dir);
        podcast.feed_url = feed_path.to_string_lossy().into_owned();
        podcast
    }

    #[test]
    fn synchronize_populates_cache_in_feed_order() {
        let dir = tempdir().unwrap();
        let podcast = podcast_with_feed(dir.path(), SAMPLE_FEED);

        let count = synchronize(&podcast).unwrap();
        assert_eq!(count, 2);

        let chapters = store::remote_chapters(&podcast).unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].url.as_str(), "https://example.org/c.mp3");
        assert_eq!(chapters[1].url.as_str(), "https://example.org/b.mp3");
    }

    #[test]
    fn synchronize_replaces_cache_completely() {
        let dir = tempdir().unwrap();
        let podcast = podcast_with_feed(dir.path(), SAMPLE_FEED);
        synchronize(&podcast).unwrap();

        let podcast = podcast_with_feed(dir.path(), REPLACEMENT_FEED);
        synchronize(&podcast).unwrap();

        let chapters = store::remote_chapters(&podcast).unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].url.as_str(), "https://example.org/z.mp3");
    }

    #[test]
    fn synchronize_migrates_legacy_pointer_first() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"audio").unwrap();
        std::fs::write(dir.path().join("LATEST"), "a.mp3\n").unwrap();
        let podcast = podcast_with_feed(dir.path(), SAMPLE_FEED);

        synchronize(&podcast).unwrap();

        assert!(!podcast.legacy_latest_path().exists());
        assert_eq!(latest::get(&podcast).unwrap(), dir.path().join("a.mp3"));
    }

    #[test]
    fn synchronize_all_attempts_every_feed() {
        let dir = tempdir().unwrap();
        let feed_path = dir.path().join("feed.xml");
        std::fs::write(&feed_path, SAMPLE_FEED).unwrap();
        let config = Config {
            fetch_command: "true".to_string(),
            player_command: "true".to_string(),
            media_dir: dir.path().join("media"),
            feeds: vec![
                ("broken".to_string(), "/nonexistent/feed.xml".to_string()),
                (
                    "working".to_string(),
                    feed_path.to_string_lossy().into_owned(),
                ),
            ],
        };

        let report = synchronize_all(&config);

        // The broken feed fails, but the one after it still syncs.
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken");
        assert_eq!(report.synced, vec![("working".to_string(), 2)]);

        let podcast = Podcast::open(&config, "working").unwrap();
        assert_eq!(store::remote_chapters(&podcast).unwrap().len(), 2);
    }

    #[test]
    fn synchronize_all_reports_no_failures_on_success() {
        let dir = tempdir().unwrap();
        let feed_path = dir.path().join("feed.xml");
        std::fs::write(&feed_path, SAMPLE_FEED).unwrap();
        let config = Config {
            fetch_command: "true".to_string(),
            player_command: "true".to_string(),
            media_dir: dir.path().join("media"),
            feeds: vec![(
                "working".to_string(),
                feed_path.to_string_lossy().into_owned(),
            )],
        };

        let report = synchronize_all(&config);
        assert!(report.failed.is_empty());
        assert_eq!(report.synced.len(), 1);
    }

    #[test]
    fn synchronize_fails_on_unreachable_feed() {
        let dir = tempdir().unwrap();
        let mut podcast = test_podcast(dir.path());
        podcast.feed_url = "/nonexistent/feed.xml".to_string();

        assert!(synchronize(&podcast).is_err());
        assert!(!podcast.cache_path().exists());
    }
}
