// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use log::info;
use url::Url;

use crate::command;
use crate::config::Config;
use crate::error::{Error, FetchError};
use crate::latest;
use crate::podcast::{Podcast, PARTIAL_SUFFIX};
use crate::store;

/// What to fetch: a 1-based index into the remote chapter cache, or a
/// literal chapter URL.
#[derive(Debug, Clone)]
pub enum ChapterRef {
    Index(usize),
    Url(Url),
}

impl std::str::FromStr for ChapterRef {
    type Err = url::ParseError;

    /// A decimal number is an index; anything else must parse as a URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Ok(ChapterRef::Index(index));
        }
        Url::parse(s).map(ChapterRef::Url)
    }
}

/// File name a chapter URL downloads to: the last path segment, with any
/// query string dropped. Tokened enclosure URLs thus reuse one stable
/// on-disk name across token rotations, and the already-on-disk check in
/// [`fetch_latest`] sees them as the same chapter.
pub fn chapter_filename(url: &Url) -> Result<String, FetchError> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(String::from)
        .ok_or_else(|| FetchError::UnusableUrl {
            url: url.to_string(),
        })
}

/// Fetch one chapter through the external download command.
///
/// The download lands in a `.part` sibling first and is only renamed to
/// its final name after the command succeeds, so an interrupted download
/// never masquerades as a fetched chapter. On success the latest pointer
/// is moved to the new file.
pub fn fetch(config: &Config, podcast: &Podcast, chapter: &ChapterRef) -> Result<PathBuf, Error> {
    let url = match chapter {
        ChapterRef::Index(index) => store::resolve_remote(podcast, *index)?.url,
        ChapterRef::Url(url) => url.clone(),
    };
    fetch_url(config, podcast, &url)
}

/// Fetch the newest remote chapter, unless it is already on disk.
pub fn fetch_latest(config: &Config, podcast: &Podcast) -> Result<PathBuf, Error> {
    let chapters = store::remote_chapters(podcast)?;
    let newest = chapters.first().ok_or(FetchError::NoChapters)?;

    let filename = chapter_filename(&newest.url)?;
    if podcast.media_dir.join(&filename).exists() {
        return Err(FetchError::NothingNew.into());
    }
    fetch_url(config, podcast, &newest.url)
}

/// Outcome of fetching across every configured podcast
#[derive(Debug)]
pub struct FetchReport {
    /// Podcast id and saved file path, for each successful fetch
    pub fetched: Vec<(String, PathBuf)>,
    /// Podcast id and error, for each podcast that failed
    pub failed: Vec<(String, Error)>,
}

/// Fetch a chapter for every configured podcast, in configuration order:
/// the given chapter when one is named, the newest remote chapter
/// otherwise.
///
/// A failing podcast does not stop the remaining ones; failures are
/// collected per id so the caller can report them after the whole run.
pub fn fetch_all(config: &Config, chapter: Option<&ChapterRef>) -> FetchReport {
    let mut fetched = Vec::new();
    let mut failed = Vec::new();
    for (id, _) in config.feeds() {
        let result = Podcast::open(config, id).and_then(|podcast| match chapter {
            Some(chapter) => fetch(config, &podcast, chapter),
            None => fetch_latest(config, &podcast),
        });
        match result {
            Ok(path) => fetched.push((id.clone(), path)),
            Err(e) => failed.push((id.clone(), e)),
        }
    }
    FetchReport { fetched, failed }
}

fn fetch_url(config: &Config, podcast: &Podcast, url: &Url) -> Result<PathBuf, Error> {
    let filename = chapter_filename(url)?;
    let destination = podcast.media_dir.join(&filename);
    let part = podcast.media_dir.join(format!("{filename}{PARTIAL_SUFFIX}"));

    let command_line = command::render(&config.fetch_command, Some(url.as_str()), &part);
    let status = command::run(&command_line).map_err(|e| FetchError::CommandFailed {
        command: command_line.clone(),
        source: e,
    })?;
    if !status.success() {
        return Err(FetchError::DownloadFailed {
            url: url.to_string(),
            status,
        }
        .into());
    }

    std::fs::rename(&part, &destination).map_err(|e| FetchError::SaveFailed {
        path: destination.clone(),
        source: e,
    })?;

    latest::set(podcast, &destination)?;
    info!("fetched {} -> {:?}", url, destination);
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Chapter;
    use crate::podcast::test_podcast;
    use tempfile::tempdir;

    // Fake downloader: ignores the URL and writes a marker byte to the
    // destination path.
    const FAKE_FETCH: &str = r#"printf audio > "%(file)s""#;

    fn config(fetch_command: &str, media_dir: &std::path::Path) -> Config {
        Config {
            fetch_command: fetch_command.to_string(),
            player_command: "true".to_string(),
            media_dir: media_dir.to_path_buf(),
            feeds: vec![],
        }
    }

    fn seed_cache(podcast: &Podcast, urls: &[&str]) {
        let chapters: Vec<Chapter> = urls
            .iter()
            .map(|u| Chapter {
                url: Url::parse(u).unwrap(),
                published: None,
            })
            .collect();
        store::write_cache(podcast, &chapters).unwrap();
    }

    #[test]
    fn chapter_filename_takes_last_segment() {
        let url = Url::parse("https://example.org/shows/ep1.mp3?token=x").unwrap();
        assert_eq!(chapter_filename(&url).unwrap(), "ep1.mp3");
    }

    #[test]
    fn chapter_filename_rejects_bare_host() {
        let url = Url::parse("https://example.org/").unwrap();
        assert!(matches!(
            chapter_filename(&url),
            Err(FetchError::UnusableUrl { .. })
        ));
    }

    #[test]
    fn fetch_by_url_promotes_part_file_and_sets_latest() {
        let dir = tempdir().unwrap();
        let podcast = test_podcast(dir.path());
        let config = config(FAKE_FETCH, dir.path());
        let url = Url::parse("https://example.org/ep1.mp3").unwrap();

        let path = fetch(&config, &podcast, &ChapterRef::Url(url)).unwrap();

        assert_eq!(path, dir.path().join("ep1.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"audio");
        assert!(!dir.path().join("ep1.mp3.part").exists());
        assert_eq!(latest::get(&podcast).unwrap(), path);
    }

    #[test]
    fn fetch_by_index_resolves_through_cache() {
        let dir = tempdir().unwrap();
        let podcast = test_podcast(dir.path());
        let config = config(FAKE_FETCH, dir.path());
        seed_cache(
            &podcast,
            &["https://example.org/c.mp3", "https://example.org/b.mp3"],
        );

        let path = fetch(&config, &podcast, &ChapterRef::Index(2)).unwrap();
        assert_eq!(path, dir.path().join("b.mp3"));
    }

    #[test]
    fn fetch_by_invalid_index_fails() {
        let dir = tempdir().unwrap();
        let podcast = test_podcast(dir.path());
        let config = config(FAKE_FETCH, dir.path());
        seed_cache(&podcast, &["https://example.org/a.mp3"]);

        for index in [0, 2] {
            let result = fetch(&config, &podcast, &ChapterRef::Index(index));
            assert!(matches!(
                result,
                Err(Error::Store(
                    crate::error::StoreError::InvalidChapter { .. }
                ))
            ));
        }
    }

    #[test]
    fn failed_download_command_leaves_no_file() {
        let dir = tempdir().unwrap();
        let podcast = test_podcast(dir.path());
        let config = config("false", dir.path());
        let url = Url::parse("https://example.org/ep1.mp3").unwrap();

        let result = fetch(&config, &podcast, &ChapterRef::Url(url));

        assert!(matches!(
            result,
            Err(Error::Fetch(FetchError::DownloadFailed { .. }))
        ));
        assert!(!dir.path().join("ep1.mp3").exists());
        assert!(matches!(
            latest::get(&podcast),
            Err(crate::error::LatestError::NoLatest)
        ));
    }

    #[test]
    fn command_that_writes_nothing_is_a_save_error() {
        let dir = tempdir().unwrap();
        let podcast = test_podcast(dir.path());
        let config = config("true", dir.path());
        let url = Url::parse("https://example.org/ep1.mp3").unwrap();

        let result = fetch(&config, &podcast, &ChapterRef::Url(url));
        assert!(matches!(
            result,
            Err(Error::Fetch(FetchError::SaveFailed { .. }))
        ));
    }

    #[test]
    fn fetch_latest_takes_newest_then_reports_nothing_new() {
        let dir = tempdir().unwrap();
        let podcast = test_podcast(dir.path());
        let config = config(FAKE_FETCH, dir.path());
        seed_cache(
            &podcast,
            &["https://example.org/c.mp3", "https://example.org/b.mp3"],
        );

        let path = fetch_latest(&config, &podcast).unwrap();
        assert_eq!(path, dir.path().join("c.mp3"));

        let second = fetch_latest(&config, &podcast);
        assert!(matches!(
            second,
            Err(Error::Fetch(FetchError::NothingNew))
        ));
    }

    #[test]
    fn chapter_ref_parses_index_or_url() {
        assert!(matches!("3".parse::<ChapterRef>(), Ok(ChapterRef::Index(3))));
        match "https://example.org/ep1.mp3".parse::<ChapterRef>() {
            Ok(ChapterRef::Url(url)) => assert_eq!(url.as_str(), "https://example.org/ep1.mp3"),
            other => panic!("expected a URL, got {:?}", other),
        }
        assert!("not a url".parse::<ChapterRef>().is_err());
    }

    #[test]
    fn fetch_all_continues_past_failing_podcasts() {
        let dir = tempdir().unwrap();
        let config = Config {
            fetch_command: FAKE_FETCH.to_string(),
            player_command: "true".to_string(),
            media_dir: dir.path().to_path_buf(),
            feeds: vec![
                (
                    "empty".to_string(),
                    "https://example.org/empty.xml".to_string(),
                ),
                (
                    "ready".to_string(),
                    "https://example.org/ready.xml".to_string(),
                ),
            ],
        };
        // "empty" has no cached chapters; "ready" has one waiting.
        let ready = Podcast::open(&config, "ready").unwrap();
        seed_cache(&ready, &["https://example.org/ep1.mp3"]);

        let report = fetch_all(&config, None);

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "empty");
        assert!(matches!(
            report.failed[0].1,
            Error::Fetch(FetchError::NoChapters)
        ));
        assert_eq!(report.fetched.len(), 1);
        assert_eq!(report.fetched[0].0, "ready");
        assert!(ready.media_dir.join("ep1.mp3").exists());
    }

    #[test]
    fn fetch_latest_with_empty_cache_is_no_chapters() {
        let dir = tempdir().unwrap();
        let podcast = test_podcast(dir.path());
        let config = config(FAKE_FETCH, dir.path());

        assert!(matches!(
            fetch_latest(&config, &podcast),
            Err(Error::Fetch(FetchError::NoChapters))
        ));
    }
}
