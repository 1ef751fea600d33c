use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub player: PlayerConfig,
    pub lyrics: LyricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Case-insensitive substring matched against the media session's source
    /// application identifier (e.g. "spotify" matches "Spotify.exe").
    pub match_id: String,
    /// Player name used in the placeholder lines.
    pub display_name: String,
    /// Poll period for the tracker loop.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    /// Directory holding one cached `.lrc` file per resolved track.
    pub cache_dir: PathBuf,
    /// LRCLIB-compatible API endpoint.
    pub base_url: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            match_id: "spotify".to_string(),
            display_name: "Spotify".to_string(),
            poll_interval_ms: 50,
        }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "lyra", "lyra");
        let cache_dir = proj
            .as_ref()
            .map(|p| p.cache_dir().join("lyrics"))
            .unwrap_or_else(|| std::env::temp_dir().join("lyra").join("lyrics"));

        Self {
            cache_dir,
            base_url: "https://lrclib.net/api".to_string(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "lyra", "lyra").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        let cfg = Config::default();
        let raw = toml::to_string_pretty(&cfg).context("serialize default config")?;
        fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
