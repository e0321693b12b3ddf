// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::error::FeedError;

/// Fetch raw feed bytes from a URL (without parsing)
pub fn fetch_feed_bytes(url: &str) -> Result<Vec<u8>, FeedError> {
    let map_err = |e: reqwest::Error| FeedError::FetchFailed {
        url: url.to_string(),
        source: e,
    };

    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(map_err)?;
    let bytes = response.bytes().map_err(map_err)?;
    Ok(bytes.to_vec())
}

/// Read raw feed bytes from a local file (without parsing)
pub fn read_feed_file(path: &Path) -> Result<Vec<u8>, FeedError> {
    std::fs::read(path).map_err(|e| FeedError::FileReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Determine if a feed source is a URL or a file path
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load feed bytes from either a remote URL or a local file path
pub fn load_feed_source(source: &str) -> Result<Vec<u8>, FeedError> {
    if is_url(source) {
        fetch_feed_bytes(source)
    } else {
        read_feed_file(Path::new(source))
    }
}
