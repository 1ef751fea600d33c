//! GSMTC media-session provider
//!
//! Reads the Windows Global System Media Transport Controls session: source
//! app id, media properties, timeline, and playback status. The manager is
//! requested once; each poll reads whatever session is current.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use windows::Media::Control::{
    GlobalSystemMediaTransportControlsSession as GsmtcSession,
    GlobalSystemMediaTransportControlsSessionManager as GsmtcManager,
    GlobalSystemMediaTransportControlsSessionPlaybackStatus as PlaybackStatus,
};

use super::{PlaybackSnapshot, SessionProvider, SessionSnapshot};

/// Windows FILETIME/DateTime tick length: 100 ns.
const TICKS_PER_SECOND: f64 = 10_000_000.0;
/// Ticks between 1601-01-01 (universal time epoch) and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;

pub struct GsmtcProvider {
    manager: GsmtcManager,
}

impl GsmtcProvider {
    pub async fn connect() -> anyhow::Result<Self> {
        let manager = GsmtcManager::RequestAsync()
            .context("request GSMTC session manager")?
            .await
            .context("await GSMTC session manager")?;
        Ok(Self { manager })
    }

    async fn read_current(&self) -> windows::core::Result<Option<SessionSnapshot>> {
        // No current session surfaces as an error from the projection.
        let session: GsmtcSession = match self.manager.GetCurrentSession() {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };

        let source_app_id = session.SourceAppUserModelId()?.to_string_lossy();
        let props = session.TryGetMediaPropertiesAsync()?.await?;
        let timeline = session.GetTimelineProperties()?;
        let status = session.GetPlaybackInfo()?.PlaybackStatus()?;

        let position_seconds = timeline.Position()?.Duration as f64 / TICKS_PER_SECOND;
        let duration_seconds = timeline.EndTime()?.Duration as f64 / TICKS_PER_SECOND;
        let captured_at = universal_time_to_system(timeline.LastUpdatedTime()?.UniversalTime);

        Ok(Some(SessionSnapshot {
            source_app_id,
            artist: props.Artist()?.to_string_lossy(),
            title: props.Title()?.to_string_lossy(),
            album: props.AlbumTitle()?.to_string_lossy(),
            duration_seconds,
            playback: PlaybackSnapshot {
                position_seconds,
                captured_at,
                is_playing: status == PlaybackStatus::Playing,
            },
        }))
    }
}

impl SessionProvider for GsmtcProvider {
    async fn current(&self) -> Option<SessionSnapshot> {
        match self.read_current().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::debug!("media session read failed: {e}");
                None
            }
        }
    }
}

/// Convert a WinRT `DateTime` (100 ns ticks since 1601-01-01 UTC) to
/// `SystemTime`. Readings before the unix epoch clamp to it.
fn universal_time_to_system(universal_time: i64) -> SystemTime {
    let unix_ticks = (universal_time - UNIX_EPOCH_TICKS).max(0) as f64;
    UNIX_EPOCH + Duration::from_secs_f64(unix_ticks / TICKS_PER_SECOND)
}
