//! Playback tracker: the poll/interpolate/lookup loop
//!
//! A single tokio task polls the media session at a fixed interval, estimates
//! the true play-head between timeline updates, looks up the active lyric
//! line, and emits each distinct line over an mpsc channel. Every tick
//! re-classifies the session from scratch (no session / wrong player /
//! tracking); all mutable state lives in `PollerState`.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::config::PlayerConfig;
use crate::lyrics::{FetchLyrics, LyricDocument, LyricsSource, TrackKey};
use crate::session::{SessionProvider, SessionSnapshot};

/// Shown while the play-head precedes every lyric line, and while a track has
/// no lyrics at all.
pub const NO_LINE_SENTINEL: &str = "...";
/// Shown from track-change detection until the lyrics resolve completes.
pub const SEARCHING_LINE: &str = "Searching...";

/// Mutable loop state, threaded through each tick.
struct PollerState {
    /// `(artist, title)` of the last track a resolve was started for.
    last_identity: Option<(String, String)>,
    /// Lyrics for the current track; replaced wholesale on track change.
    document: LyricDocument,
    /// Last emitted text. `None` forces the next position check to emit.
    displayed: Option<String>,
    /// Single-slot in-flight resolve guard: while this is occupied, no new
    /// fetch may start. Cleared only on completion, success or failure.
    fetch: Option<oneshot::Receiver<LyricDocument>>,
}

impl PollerState {
    fn new() -> Self {
        Self {
            last_identity: None,
            document: LyricDocument::default(),
            displayed: None,
            fetch: None,
        }
    }

    /// Forget the tracked identity and its lyrics. Called whenever the
    /// session is gone or belongs to some other player, so that re-entering
    /// the tracking state resolves fresh (usually a cache hit).
    fn reset_track(&mut self) {
        self.last_identity = None;
        self.document = LyricDocument::default();
    }
}

pub struct Tracker<P, F> {
    provider: P,
    source: Arc<LyricsSource<F>>,
    /// Lowercased substring matched against the session's source app id.
    match_id: String,
    waiting_line: String,
    wrong_source_line: String,
    poll_interval: Duration,
    state: PollerState,
    tx: mpsc::Sender<String>,
}

impl<P, F> Tracker<P, F>
where
    P: SessionProvider,
    F: FetchLyrics,
{
    pub fn new(
        provider: P,
        source: Arc<LyricsSource<F>>,
        player: &PlayerConfig,
        tx: mpsc::Sender<String>,
    ) -> Self {
        Self {
            provider,
            source,
            match_id: player.match_id.to_lowercase(),
            waiting_line: format!("Waiting for {}...", player.display_name),
            wrong_source_line: format!("Not {}", player.display_name),
            poll_interval: Duration::from_millis(player.poll_interval_ms),
            state: PollerState::new(),
            tx,
        }
    }

    /// Run for the process lifetime. Exits only once the sink side of the
    /// channel is gone.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let snapshot = self.provider.current().await;
            self.tick(snapshot, SystemTime::now()).await;
            if self.tx.is_closed() {
                tracing::info!("line sink closed, stopping tracker");
                return;
            }
        }
    }

    /// One poll: classify the session and emit at most one line change.
    /// Level-triggered; there is no "session appeared" event, just a fresh
    /// comparison against the previous tick's state.
    async fn tick(&mut self, snapshot: Option<SessionSnapshot>, now: SystemTime) {
        let Some(snapshot) = snapshot else {
            self.emit(self.waiting_line.clone()).await;
            self.state.reset_track();
            return;
        };

        if !snapshot
            .source_app_id
            .to_lowercase()
            .contains(&self.match_id)
        {
            self.emit(self.wrong_source_line.clone()).await;
            self.state.reset_track();
            return;
        }

        self.drain_fetch();
        self.maybe_start_fetch(&snapshot).await;

        // While a resolve is in flight the searching line stays up; the
        // not-yet-replaced document would answer for the wrong track.
        if self.state.fetch.is_none() && snapshot.playback.is_playing {
            let position = snapshot.playback.estimated_position(now);
            let line = self
                .state
                .document
                .active_line(position)
                .unwrap_or(NO_LINE_SENTINEL)
                .to_string();
            self.emit(line).await;
        }
        // Paused: position does not advance, last line stays as-is.
    }

    /// Install a completed resolve, if any, and free the in-flight slot.
    fn drain_fetch(&mut self) {
        let Some(rx) = self.state.fetch.as_mut() else {
            return;
        };
        let document = match rx.try_recv() {
            Ok(document) => document,
            Err(oneshot::error::TryRecvError::Empty) => return,
            // Resolve task died; same outcome as "no lyrics".
            Err(oneshot::error::TryRecvError::Closed) => LyricDocument::default(),
        };

        tracing::debug!(lines = document.lines().len(), "installed lyric document");
        self.state.document = document;
        self.state.fetch = None;
        // Clear the displayed line so the next position check re-emits even
        // if the active line text happens to match the old track's.
        self.state.displayed = None;
    }

    /// Start a resolve when the track identity changed and no fetch is in
    /// flight. The gate (occupied slot) is what keeps a slow lookup from
    /// racing a rapid subsequent track change.
    async fn maybe_start_fetch(&mut self, snapshot: &SessionSnapshot) {
        if self.state.fetch.is_some() {
            return;
        }
        let identity = (snapshot.artist.clone(), snapshot.title.clone());
        if self.state.last_identity.as_ref() == Some(&identity) {
            return;
        }

        tracing::info!(artist = %identity.0, title = %identity.1, "track changed");
        self.state.last_identity = Some(identity);
        self.emit(SEARCHING_LINE.to_string()).await;

        let key = TrackKey {
            artist: snapshot.artist.clone(),
            title: snapshot.title.clone(),
            album: snapshot.album.clone(),
            duration_seconds: snapshot.duration_seconds,
        };
        let source = Arc::clone(&self.source);
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(async move {
            let document = source.resolve(&key).await;
            let _ = done_tx.send(document);
        });
        self.state.fetch = Some(done_rx);
    }

    /// Send a line to the sink unless it matches the previous emission.
    async fn emit(&mut self, line: String) {
        if self.state.displayed.as_deref() == Some(line.as_str()) {
            return;
        }
        let _ = self.tx.send(line.clone()).await;
        self.state.displayed = Some(line);
    }
}
