//! OS media-session abstraction
//!
//! One snapshot per poll: who is playing, what track, and the last
//! authoritative timeline reading. The timeline only updates on the OS's own
//! schedule, so `PlaybackSnapshot::estimated_position` interpolates with
//! wall-clock time elapsed since the reading was captured.

#[cfg(target_os = "windows")]
pub mod windows;

use std::time::SystemTime;

/// A timeline reading taken at a point in time, used as the interpolation
/// anchor until superseded by the next poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    /// Last position reported by the session, in seconds.
    pub position_seconds: f64,
    /// Wall-clock instant that reading was taken by the OS.
    pub captured_at: SystemTime,
    /// Whether the transport state is actively playing.
    pub is_playing: bool,
}

impl PlaybackSnapshot {
    /// Estimated true play-head position at `now`: the anchored position plus
    /// wall-clock time elapsed since the capture instant. If the clock reads
    /// earlier than the capture (skew, suspend), the elapsed time clamps to
    /// zero rather than rewinding.
    pub fn estimated_position(&self, now: SystemTime) -> f64 {
        let elapsed = now
            .duration_since(self.captured_at)
            .unwrap_or_default()
            .as_secs_f64();
        self.position_seconds + elapsed
    }
}

/// One poll's view of the active media session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Source application identifier, e.g. "Spotify.exe".
    pub source_app_id: String,
    pub artist: String,
    pub title: String,
    pub album: String,
    /// Track length in seconds, forwarded to the lyrics lookup.
    pub duration_seconds: f64,
    pub playback: PlaybackSnapshot,
}

/// Read access to the current OS media session.
///
/// `None` means no session is observable. Implementations absorb their own
/// errors into `None`; a flaky provider must never take the poll loop down.
pub trait SessionProvider: Send + 'static {
    fn current(&self) -> impl Future<Output = Option<SessionSnapshot>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_estimated_position_advances_with_wall_clock() {
        let t0 = SystemTime::now();
        let snap = PlaybackSnapshot {
            position_seconds: 30.0,
            captured_at: t0,
            is_playing: true,
        };

        let est = snap.estimated_position(t0 + Duration::from_secs(2));
        assert!((est - 32.0).abs() < 1e-9, "got {est}");
    }

    #[test]
    fn test_estimated_position_at_capture_instant() {
        let t0 = SystemTime::now();
        let snap = PlaybackSnapshot {
            position_seconds: 12.5,
            captured_at: t0,
            is_playing: true,
        };
        assert_eq!(snap.estimated_position(t0), 12.5);
    }

    #[test]
    fn test_estimated_position_clamps_on_clock_skew() {
        let t0 = SystemTime::now();
        let snap = PlaybackSnapshot {
            position_seconds: 30.0,
            captured_at: t0,
            is_playing: true,
        };
        // Clock stepped backwards: hold position instead of rewinding.
        assert_eq!(snap.estimated_position(t0 - Duration::from_secs(5)), 30.0);
    }
}
