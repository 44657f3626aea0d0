//! One interactive session: resolve the video, search its transcript, and
//! drive the player to a chosen match.
//!
//! All methods take `&self` so overlapping calls are possible. Each search and
//! each activation takes a generation number; a result that arrives after a
//! newer one started is dropped without touching the session state. A search
//! also remembers which stored identity it ran against and is dropped if an
//! activation replaced that identity in the meantime.

pub mod events;
pub mod poller;

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serde::Serialize;
use tracing::{debug, info, warn};

pub use events::{PlaybackTimeUpdated, SearchCompleted, SearchOutcome, SeekFailed, VideoResolved};
pub use poller::PlaybackPoller;

use crate::{
    bridge::{HostBridge, PlaybackSample, PlayerProxy, SeekOutcome},
    config::WordjumpConfig,
    events::EventBus,
    identity::VideoIdentityResolver,
    search::search,
    transcript::{FallbackTranscripts, FixtureTranscripts, RemoteTranscripts, TranscriptSource},
    types::{SearchMatch, VideoIdentity},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Uninitialized,
    Resolving,
    Ready,
    Searching,
    Seeking,
}

/// Error flag left for the UI after an operation fell back to `Ready`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAlert {
    TranscriptUnavailable { video_id: String, reason: String },
    SeekFailed { timestamp: f64, outcome: SeekOutcome },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub matches: Vec<SearchMatch>,
    pub outcome: SearchOutcome,
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<VideoIdentity>,
    captions_available: Option<bool>,
    matches: Vec<SearchMatch>,
    position: f64,
    alert: Option<SessionAlert>,
    /// Bumped each time an activation stores its identity.
    identity_epoch: u64,
    resolving: usize,
    searching: usize,
    seeking: usize,
}

impl SessionState {
    fn phase(&self) -> SessionPhase {
        if self.resolving > 0 {
            SessionPhase::Resolving
        } else if self.identity.is_none() {
            SessionPhase::Uninitialized
        } else if self.searching > 0 {
            SessionPhase::Searching
        } else if self.seeking > 0 {
            SessionPhase::Seeking
        } else {
            SessionPhase::Ready
        }
    }
}

pub struct SessionController {
    proxy: PlayerProxy,
    resolver: VideoIdentityResolver,
    transcripts: Arc<dyn TranscriptSource>,
    bus: EventBus,
    search_generation: AtomicU64,
    identity_generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl SessionController {
    pub fn new(
        host: Arc<dyn HostBridge>,
        transcripts: Arc<dyn TranscriptSource>,
        fallback_video_id: impl Into<String>,
        bus: EventBus,
    ) -> Self {
        let proxy = PlayerProxy::new(host);
        Self {
            resolver: VideoIdentityResolver::new(proxy.clone(), fallback_video_id),
            proxy,
            transcripts,
            bus,
            search_generation: AtomicU64::new(0),
            identity_generation: AtomicU64::new(0),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Remote transcripts with the local fixtures behind them.
    pub fn from_config(config: &WordjumpConfig, host: Arc<dyn HostBridge>, bus: EventBus) -> Self {
        let transcripts = FallbackTranscripts::new(
            RemoteTranscripts::new(config.transcript_endpoint.clone()),
            FixtureTranscripts::new(config.demo_video_id.clone()),
        );
        Self::new(host, Arc::new(transcripts), config.demo_video_id.clone(), bus)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> T {
        // no update spans an unwind point, so poisoned state is still whole
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Resolve the current video. `None` if a newer activation overtook this one.
    pub async fn activate(&self) -> Option<VideoIdentity> {
        let generation = self.identity_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.with_state(|s| s.resolving += 1);

        let resolution = self.resolver.resolve().await;
        let position = self.proxy.current_time().await;

        let identity = resolution.identity;
        let captions_available = if identity.is_fallback {
            Some(true)
        } else {
            resolution.captions_available
        };

        let current = self.with_state(|s| {
            s.resolving -= 1;
            if self.identity_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            s.identity = Some(identity.clone());
            s.identity_epoch += 1;
            s.captions_available = captions_available;
            s.position = position;
            s.matches.clear();
            s.alert = None;
            true
        });

        if !current {
            debug!(video_id = %identity.video_id, "discarding superseded video resolution");
            return None;
        }

        info!(
            video_id = %identity.video_id,
            fallback = identity.is_fallback,
            "session ready"
        );
        self.bus.publish(Arc::new(VideoResolved::new(
            identity.clone(),
            captions_available,
        )));
        Some(identity)
    }

    /// Search the current video's transcript for `term`.
    ///
    /// Activates the session first if needed. Returns `None` when a newer
    /// search started, or another activation stored an identity, before this
    /// one finished.
    pub async fn search(&self, term: &str) -> Option<SearchReport> {
        if self.identity().is_none() {
            self.activate().await?;
        }

        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (identity, epoch) = self.with_state(|s| {
            let identity = s.identity.clone()?;
            s.searching += 1;
            Some((identity, s.identity_epoch))
        })?;

        let fetched = if term.trim().is_empty() {
            Ok(Vec::new())
        } else {
            self.transcripts.transcript(&identity.video_id).await
        };

        let report = match &fetched {
            Ok(segments) => {
                let matches = search(segments, term);
                let outcome = if matches.is_empty() {
                    SearchOutcome::NoMatches
                } else {
                    SearchOutcome::MatchesFound
                };
                SearchReport { matches, outcome }
            }
            Err(e) => {
                warn!(video_id = %identity.video_id, error = %e, "transcript unavailable");
                SearchReport {
                    matches: Vec::new(),
                    outcome: SearchOutcome::FetchError,
                }
            }
        };

        let current = self.with_state(|s| {
            s.searching -= 1;
            let stale = self.search_generation.load(Ordering::SeqCst) != generation
                || s.identity_epoch != epoch
                || s.identity.as_ref() != Some(&identity);
            if stale {
                return false;
            }
            s.matches = report.matches.clone();
            s.alert = fetched.as_ref().err().map(|e| SessionAlert::TranscriptUnavailable {
                video_id: identity.video_id.clone(),
                reason: e.to_string(),
            });
            true
        });

        if !current {
            debug!(term, "discarding superseded search result");
            return None;
        }

        self.bus.publish(Arc::new(SearchCompleted::new(
            identity.video_id,
            term.to_string(),
            report.outcome,
            report.matches.len(),
        )));
        Some(report)
    }

    /// Move the player to `timestamp` seconds.
    ///
    /// The tracked position changes immediately and stays changed even if
    /// the seek fails; a failure sets a seek alert instead.
    pub async fn jump_to(&self, timestamp: f64) -> SeekOutcome {
        if !timestamp.is_finite() {
            warn!(timestamp, "refusing to seek to a non-finite timestamp");
            return SeekOutcome::InvalidTarget;
        }
        let timestamp = timestamp.max(0.0);

        self.with_state(|s| {
            s.position = timestamp;
            s.seeking += 1;
        });

        let outcome = self.proxy.seek_to(timestamp).await;

        self.with_state(|s| {
            s.seeking -= 1;
            if outcome.is_success() {
                if matches!(s.alert, Some(SessionAlert::SeekFailed { .. })) {
                    s.alert = None;
                }
            } else {
                s.alert = Some(SessionAlert::SeekFailed { timestamp, outcome });
            }
        });

        if outcome.is_success() {
            debug!(timestamp, "player seeked");
        } else {
            warn!(timestamp, ?outcome, "seek failed");
            self.bus
                .publish(Arc::new(SeekFailed::new(timestamp, outcome)));
        }
        outcome
    }

    /// Read the live position once; one step of [`PlaybackPoller`].
    pub async fn refresh_playback(&self) -> Option<PlaybackSample> {
        let sample = self.proxy.playback().await?;
        self.with_state(|s| s.position = sample.current_time);
        self.bus.publish(Arc::new(PlaybackTimeUpdated::new(
            sample.current_time,
            sample.playing,
        )));
        Some(sample)
    }

    /// Poll the player every `every` while it keeps playing.
    pub fn follow_playback(self: &Arc<Self>, every: Duration) -> PlaybackPoller {
        PlaybackPoller::start(Arc::clone(self), every)
    }

    pub fn phase(&self) -> SessionPhase {
        self.with_state(|s| s.phase())
    }

    pub fn identity(&self) -> Option<VideoIdentity> {
        self.with_state(|s| s.identity.clone())
    }

    /// `None` while unknown.
    pub fn captions_available(&self) -> Option<bool> {
        self.with_state(|s| s.captions_available)
    }

    pub fn matches(&self) -> Vec<SearchMatch> {
        self.with_state(|s| s.matches.clone())
    }

    pub fn playback_position(&self) -> f64 {
        self.with_state(|s| s.position)
    }

    pub fn alert(&self) -> Option<SessionAlert> {
        self.with_state(|s| s.alert.clone())
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{LocalHost, PageAgent, PageState, UnavailableHost};

    fn offline_session() -> SessionController {
        SessionController::new(
            Arc::new(UnavailableHost),
            Arc::new(FixtureTranscripts::default()),
            "dQw4w9WgXcQ",
            EventBus::detached(),
        )
    }

    #[tokio::test]
    async fn starts_uninitialized() {
        let session = offline_session();
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert_eq!(session.identity(), None);
        assert_eq!(session.captions_available(), None);
    }

    #[tokio::test]
    async fn fallback_session_is_ready_and_captioned() {
        let session = offline_session();
        let identity = session.activate().await.unwrap();

        assert!(identity.is_fallback);
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.captions_available(), Some(true));
        assert_eq!(session.playback_position(), 0.0);
    }

    #[tokio::test]
    async fn search_activates_lazily() {
        let session = offline_session();
        let report = session.search("strangers").await.unwrap();

        assert_eq!(report.outcome, SearchOutcome::MatchesFound);
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.matches[0].timestamp, 19.0);
        assert_eq!(session.matches(), report.matches);
    }

    #[tokio::test]
    async fn blank_term_is_no_matches() {
        let session = offline_session();
        let report = session.search("  ").await.unwrap();
        assert_eq!(report.outcome, SearchOutcome::NoMatches);
        assert!(report.matches.is_empty());
    }

    #[tokio::test]
    async fn failed_seek_keeps_optimistic_position() {
        let session = offline_session();
        session.activate().await;

        let outcome = session.jump_to(43.0).await;

        assert_eq!(outcome, SeekOutcome::Unreachable);
        assert_eq!(session.playback_position(), 43.0);
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(
            session.alert(),
            Some(SessionAlert::SeekFailed {
                timestamp: 43.0,
                outcome: SeekOutcome::Unreachable
            })
        );
    }

    #[tokio::test]
    async fn non_finite_seek_is_rejected() {
        let session = offline_session();
        assert_eq!(session.jump_to(f64::NAN).await, SeekOutcome::InvalidTarget);
        assert_eq!(session.playback_position(), 0.0);
    }

    #[tokio::test]
    async fn live_page_resolves_real_identity() {
        let page = PageState::watch_page("https://www.youtube.com/watch?v=9bZkp7q19f0").shared();
        let session = SessionController::new(
            Arc::new(LocalHost::attach(PageAgent::new(page))),
            Arc::new(FixtureTranscripts::default()),
            "dQw4w9WgXcQ",
            EventBus::detached(),
        );

        let identity = session.activate().await.unwrap();
        assert_eq!(identity, VideoIdentity::resolved("9bZkp7q19f0"));
        assert_eq!(session.captions_available(), Some(true));

        assert_eq!(session.jump_to(30.0).await, SeekOutcome::Seeked);
        assert_eq!(session.alert(), None);
    }

    #[tokio::test]
    async fn poisoned_state_is_recovered() {
        let session = offline_session();
        session.activate().await.unwrap();

        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = session.state.lock().unwrap();
            panic!("holder panicked");
        }));
        assert!(panicked.is_err());
        assert!(session.state.is_poisoned());

        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.jump_to(5.0).await, SeekOutcome::Unreachable);
        assert_eq!(session.playback_position(), 5.0);
    }

    #[tokio::test]
    async fn reactivation_clears_previous_matches() {
        let session = offline_session();
        session.search("never").await.unwrap();
        assert!(!session.matches().is_empty());

        session.activate().await.unwrap();
        assert!(session.matches().is_empty());
    }
}
