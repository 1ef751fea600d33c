//! On-disk lyrics cache
//!
//! One `.lrc` file per resolved track, named from the normalized artist and
//! title. Entries are written once after the first successful fetch and never
//! expired, revalidated, or deleted; a hit is trusted unconditionally even if
//! the album or duration differ from the request. Known limitation, kept on
//! purpose.

use anyhow::Context;
use std::fs;
use std::path::PathBuf;

use super::TrackKey;

#[derive(Debug, Clone)]
pub struct LyricsCache {
    dir: PathBuf,
}

impl LyricsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read the cached raw LRC text for a track, if present.
    ///
    /// Any read error counts as a miss; the caller falls through to the
    /// network.
    pub fn read(&self, key: &TrackKey) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("failed to read {}: {e}", path.display());
                None
            }
        }
    }

    /// Persist the raw fetched text verbatim. First write wins.
    pub fn write(&self, key: &TrackKey, raw: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create dir {}", self.dir.display()))?;
        let path = self.path_for(key);
        if path.exists() {
            return Ok(());
        }
        fs::write(&path, raw).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    fn path_for(&self, key: &TrackKey) -> PathBuf {
        self.dir.join(cache_file_name(&key.artist, &key.title))
    }
}

/// Cache filename for a track: `lower(artist)_lower(title)` with spaces
/// replaced by underscores, plus the `.lrc` extension.
fn cache_file_name(artist: &str, title: &str) -> String {
    let mut name = format!("{}_{}", artist.to_lowercase(), title.to_lowercase()).replace(' ', "_");
    name.push_str(".lrc");
    name
}
