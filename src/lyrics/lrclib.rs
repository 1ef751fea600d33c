//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API that provides synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use serde::Deserialize;

use super::{FetchLyrics, TrackKey};

/// LRCLIB `/get` response. Only the synced lyrics are of interest; a response
/// without them is treated the same as a miss.
#[derive(Debug, Deserialize, Clone)]
pub struct LrclibResponse {
    #[serde(rename = "syncedLyrics")]
    pub synced_lyrics: Option<String>,
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";
    const USER_AGENT: &'static str = "lyra/0.1.0 (https://github.com/lyra)";
    const TIMEOUT_SECS: u64 = 10;

    /// Create a new LRCLIB client against the public API.
    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (config override, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(Self::USER_AGENT)
                .timeout(std::time::Duration::from_secs(Self::TIMEOUT_SECS))
                .build()
                .expect("failed to create reqwest client"),
            base_url: base_url.into(),
        }
    }

    /// Fetch synced lyrics for an exact track match.
    ///
    /// `Ok(None)` covers both "no such track" and "track has no synced
    /// lyrics": any non-2xx status or absent `syncedLyrics` field. Transport
    /// errors and timeouts surface as `Err` and are absorbed by the caller.
    async fn get_synced(&self, key: &TrackKey) -> anyhow::Result<Option<String>> {
        let url = format!(
            "{}/get?artist_name={}&track_name={}&album_name={}&duration={}",
            self.base_url,
            urlencoding::encode(&key.artist),
            urlencoding::encode(&key.title),
            urlencoding::encode(&key.album),
            key.duration_seconds.round() as u64,
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            tracing::debug!("lrclib returned {} for {url}", response.status());
            return Ok(None);
        }

        let body: LrclibResponse = response.json().await?;
        Ok(body.synced_lyrics.filter(|s| !s.is_empty()))
    }
}

impl FetchLyrics for LrclibClient {
    async fn fetch_synced(&self, key: &TrackKey) -> anyhow::Result<Option<String>> {
        self.get_synced(key).await
    }
}

impl Default for LrclibClient {
    fn default() -> Self {
        Self::new()
    }
}
