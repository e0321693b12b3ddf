use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

const CONFIG_TEMPLATE: &str = r#"[config]

# Fetch command used to download chapter files.
# %(url)s is replaced with the chapter URL, %(file)s with the
# destination path.
#
# Examples:
#   wget --limit-rate=30k -c -O "%(file)s" "%(url)s"
#   curl --limit-rate 30K -C - -o "%(file)s" "%(url)s"
fetch_command = 'wget -c -O "%(file)s" "%(url)s"'

# Player command used to play fetched files.
#
# Examples:
#   mpv "%(file)s"
#   mpg123 "%(file)s"
player_command = 'mpv "%(file)s"'

# Root directory where fetched files are stored, one subdirectory
# per podcast id.
media_dir = "~/podcasts"

[podcast]

# Your podcast feeds, one per line:
#   podcast_id = "http://example.org/rss/feed.xml"
"#;

#[derive(Debug, Deserialize)]
struct RawConfig {
    config: RawCore,
    #[serde(default)]
    podcast: toml::value::Table,
}

#[derive(Debug, Deserialize)]
struct RawCore {
    fetch_command: Option<String>,
    player_command: Option<String>,
    media_dir: Option<String>,
}

/// Validated process-wide configuration, loaded once and read-only after
#[derive(Debug, Clone)]
pub struct Config {
    /// Shell template with `%(url)s` / `%(file)s` placeholders
    pub fetch_command: String,
    /// Shell template with a `%(file)s` placeholder
    pub player_command: String,
    /// Root storage directory, `~` already expanded
    pub media_dir: PathBuf,
    /// Podcast id -> feed source, in declaration order
    pub(crate) feeds: Vec<(String, String)>,
}

impl Config {
    /// Default config file location (`~/.config/podkeep/config.toml`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("podkeep")
            .join("config.toml")
    }

    /// Load and validate a config file.
    ///
    /// When the file does not exist, a commented template is written to
    /// its path and `ConfigError::TemplateCreated` is returned so the
    /// caller can map it to a usage exit.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            write_template(path)?;
            return Err(ConfigError::TemplateCreated {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let raw: RawConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let fetch_command = require(raw.config.fetch_command, "fetch_command")?;
        let player_command = require(raw.config.player_command, "player_command")?;
        let media_dir = require(raw.config.media_dir, "media_dir")?;
        let media_dir = expand_tilde(&media_dir)?;

        // The [podcast] table keeps declaration order (toml preserve_order),
        // which defines the listing and bulk-operation order.
        let mut feeds = Vec::with_capacity(raw.podcast.len());
        for (id, value) in raw.podcast {
            let url = value
                .as_str()
                .ok_or_else(|| ConfigError::InvalidFeedValue { id: id.clone() })?;
            feeds.push((id, url.to_string()));
        }

        Ok(Config {
            fetch_command,
            player_command,
            media_dir,
            feeds,
        })
    }

    /// Configured feeds as (id, feed source) pairs, in declaration order
    pub fn feeds(&self) -> &[(String, String)] {
        &self.feeds
    }

    /// Feed source for one podcast id
    pub fn feed_url(&self, id: &str) -> Result<&str, ConfigError> {
        self.feeds
            .iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, url)| url.as_str())
            .ok_or_else(|| ConfigError::UnknownPodcast { id: id.to_string() })
    }
}

fn require(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingKey { key }),
    }
}

fn write_template(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::TemplateWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, CONFIG_TEMPLATE).map_err(|e| ConfigError::TemplateWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

fn expand_tilde(value: &str) -> Result<PathBuf, ConfigError> {
    if value != "~" && !value.starts_with("~/") {
        return Ok(PathBuf::from(value));
    }
    let home = dirs::home_dir().ok_or_else(|| ConfigError::HomeDirUnavailable {
        value: value.to_string(),
    })?;
    match value.strip_prefix("~/") {
        Some(rest) => Ok(home.join(rest)),
        None => Ok(home),
    }
}
