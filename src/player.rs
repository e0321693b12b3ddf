use std::path::{Path, PathBuf};

use log::info;
use rand::seq::SliceRandom;

use crate::command;
use crate::config::Config;
use crate::error::{Error, PlayError};
use crate::latest;
use crate::podcast::Podcast;
use crate::store;

/// What to play: a 1-based index into the fetched listing, or a literal
/// filename inside the media directory.
#[derive(Debug, Clone)]
pub enum PlayTarget {
    Index(usize),
    File(String),
}

impl std::str::FromStr for PlayTarget {
    type Err = std::convert::Infallible;

    /// A decimal number is an index; anything else names a file.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(index) => PlayTarget::Index(index),
            Err(_) => PlayTarget::File(s.to_string()),
        })
    }
}

/// Play one fetched chapter through the external player command.
pub fn play(config: &Config, podcast: &Podcast, target: &PlayTarget) -> Result<(), Error> {
    let path = match target {
        PlayTarget::Index(index) => store::resolve_fetched(podcast, *index)?,
        // A literal name is reduced to its basename so it cannot escape
        // the media directory.
        PlayTarget::File(name) => {
            let name = Path::new(name)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(name));
            podcast.media_dir.join(name)
        }
    };
    play_file(config, &path)
}

/// Play whatever the latest pointer currently points at.
pub fn play_latest(config: &Config, podcast: &Podcast) -> Result<(), Error> {
    let path = latest::get(podcast)?;
    play_file(config, &path)
}

/// Play a uniformly random fetched chapter.
pub fn play_random(config: &Config, podcast: &Podcast) -> Result<(), Error> {
    let files = store::fetched_chapters(podcast)?;
    let path = files
        .choose(&mut rand::thread_rng())
        .ok_or(PlayError::NoChapters)?;
    play_file(config, path)
}

fn play_file(config: &Config, path: &Path) -> Result<(), Error> {
    let command_line = command::render(&config.player_command, None, path);
    let status = command::run(&command_line).map_err(|e| PlayError::CommandFailed {
        command: command_line.clone(),
        source: e,
    })?;
    if !status.success() {
        return Err(PlayError::PlaybackFailed {
            path: path.to_path_buf(),
            status,
        }
        .into());
    }
    info!("played {:?}", path);
    Ok(())
}
