use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::LatestError;
use crate::podcast::Podcast;

/// Resolve the latest-pointer symlink to an absolute path.
///
/// The link target is a bare filename relative to the media directory;
/// other tools inspect the link directly, so that format is a contract.
pub fn get(podcast: &Podcast) -> Result<PathBuf, LatestError> {
    let link = podcast.latest_path();
    match std::fs::symlink_metadata(&link) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LatestError::NoLatest),
        Err(e) => {
            return Err(LatestError::ReadFailed {
                path: link,
                source: e,
            })
        }
    }

    let target = std::fs::read_link(&link).map_err(|e| LatestError::ReadFailed {
        path: link.clone(),
        source: e,
    })?;
    let resolved = podcast.media_dir.join(&target);
    if !resolved.exists() {
        return Err(LatestError::Broken {
            link,
            target: resolved,
        });
    }
    Ok(resolved)
}

/// Point the latest-pointer at a freshly fetched file.
///
/// The old link is deleted before the new one is created, so a crash in
/// between leaves no pointer rather than a corrupt one. The window where
/// neither link exists is a known limitation.
pub fn set(podcast: &Podcast, path: &Path) -> Result<(), LatestError> {
    let link = podcast.latest_path();
    let target = path.file_name().ok_or_else(|| LatestError::UpdateFailed {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;

    if std::fs::symlink_metadata(&link).is_ok() {
        std::fs::remove_file(&link).map_err(|e| LatestError::UpdateFailed {
            path: link.clone(),
            source: e,
        })?;
    }
    std::os::unix::fs::symlink(target, &link).map_err(|e| LatestError::UpdateFailed {
        path: link.clone(),
        source: e,
    })?;
    debug!("latest pointer for {:?} -> {:?}", podcast.id, target);
    Ok(())
}

/// Convert an old-style plain-text `LATEST` file into the symlink format.
///
/// A no-op when no legacy file exists, so running it on every sync is
/// safe. Conversion failures are reported, never swallowed.
pub fn migrate_legacy(podcast: &Podcast) -> Result<(), LatestError> {
    let legacy = podcast.legacy_latest_path();
    if !legacy.exists() {
        return Ok(());
    }

    let migrate = || -> io::Result<String> {
        let contents = std::fs::read_to_string(&legacy)?;
        let target = contents.trim().to_string();
        std::os::unix::fs::symlink(&target, podcast.latest_path())?;
        std::fs::remove_file(&legacy)?;
        Ok(target)
    };

    match migrate() {
        Ok(target) => {
            info!(
                "migrated legacy LATEST file for {:?} to symlink -> {:?}",
                podcast.id, target
            );
            Ok(())
        }
        Err(e) => Err(LatestError::MigrationFailed {
            path: legacy,
            source: e,
        }),
    }
}
