// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use log::warn;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FeedError;

/// One downloadable chapter of a podcast, as advertised by its feed.
///
/// The on-disk cache stores each chapter as a `[url, published]` pair;
/// older caches may contain bare URL strings, which are still accepted
/// on read. `published` is the feed's raw timestamp string, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CacheEntry", into = "CacheEntry")]
pub struct Chapter {
    pub url: Url,
    pub published: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CacheEntry {
    Pair(Url, Option<String>),
    Bare(Url),
}

impl From<CacheEntry> for Chapter {
    fn from(entry: CacheEntry) -> Self {
        match entry {
            CacheEntry::Pair(url, published) => Chapter { url, published },
            CacheEntry::Bare(url) => Chapter {
                url,
                published: None,
            },
        }
    }
}

impl From<Chapter> for CacheEntry {
    fn from(chapter: Chapter) -> Self {
        CacheEntry::Pair(chapter.url, chapter.published)
    }
}

/// Parse feed XML into the chapter sequence, in feed order.
///
/// Only enclosures whose MIME category is audio or video qualify. The feed
/// is trusted to list entries newest-first; no re-sorting happens here.
pub fn parse_chapters(xml: &[u8]) -> Result<Vec<Chapter>, FeedError> {
    let channel = rss::Channel::read_from(xml)?;

    let mut chapters = Vec::new();
    for item in channel.items() {
        let Some(enclosure) = item.enclosure() else {
            continue;
        };
        if !is_media_type(enclosure.mime_type()) {
            continue;
        }
        let url = match Url::parse(enclosure.url()) {
            Ok(url) => url,
            Err(e) => {
                warn!("skipping enclosure with unparseable URL {:?}: {}", enclosure.url(), e);
                continue;
            }
        };
        chapters.push(Chapter {
            url,
            published: item.pub_date().map(String::from),
        });
    }

    Ok(chapters)
}

fn is_media_type(mime: &str) -> bool {
    matches!(mime.split('/').next(), Some("audio") | Some("video"))
}
