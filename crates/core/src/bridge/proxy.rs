use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::bridge::{
    BridgeRequest, BridgeResponse, HostBridge, HostError, VideoIdReply,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekOutcome {
    Seeked,
    /// The page answered but has no video element.
    NoVideoElement,
    /// No tab, no listener, or no messaging capability.
    Unreachable,
    /// Timestamp was NaN or infinite; nothing was sent.
    InvalidTarget,
}

impl SeekOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SeekOutcome::Seeked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSample {
    pub current_time: f64,
    pub playing: bool,
}

/// UI-side caller of the page agent.
///
/// Every method resolves; transport failures are logged and replaced with a
/// default so the UI stays usable outside a real page.
#[derive(Clone)]
pub struct PlayerProxy {
    host: Arc<dyn HostBridge>,
}

impl PlayerProxy {
    pub fn new(host: Arc<dyn HostBridge>) -> Self {
        Self { host }
    }

    pub fn host_available(&self) -> bool {
        self.host.is_available()
    }

    async fn round_trip(&self, request: BridgeRequest) -> Result<BridgeResponse, HostError> {
        if !self.host.is_available() {
            return Err(HostError::Unavailable);
        }
        let tab = self.host.active_tab().await?;
        debug!(%tab, action = request.action(), "bridge request");
        self.host.send(tab, &request).await
    }

    /// `None` when the page could not be asked.
    pub async fn video_probe(&self) -> Option<VideoIdReply> {
        match self.round_trip(BridgeRequest::GetVideoId).await {
            Ok(BridgeResponse::VideoId(reply)) => Some(reply),
            Ok(other) => {
                warn!(got = other.kind(), "unexpected reply to getVideoId");
                None
            }
            Err(e) => {
                debug!(error = %e, "getVideoId failed");
                None
            }
        }
    }

    pub async fn playback(&self) -> Option<PlaybackSample> {
        match self.round_trip(BridgeRequest::GetCurrentTime).await {
            Ok(BridgeResponse::CurrentTime(reply)) => Some(PlaybackSample {
                current_time: reply.current_time,
                playing: reply.playing,
            }),
            Ok(other) => {
                warn!(got = other.kind(), "unexpected reply to getCurrentTime");
                None
            }
            Err(e) => {
                debug!(error = %e, "getCurrentTime failed");
                None
            }
        }
    }

    /// Current playback position, `0` when unknown.
    pub async fn current_time(&self) -> f64 {
        self.playback()
            .await
            .map(|sample| sample.current_time)
            .unwrap_or(0.0)
    }

    pub async fn seek_to(&self, timestamp: f64) -> SeekOutcome {
        match self.round_trip(BridgeRequest::SeekToTime { timestamp }).await {
            Ok(BridgeResponse::Seek(reply)) if reply.success => SeekOutcome::Seeked,
            Ok(BridgeResponse::Seek(_)) => SeekOutcome::NoVideoElement,
            Ok(other) => {
                warn!(got = other.kind(), "unexpected reply to seekToTime");
                SeekOutcome::Unreachable
            }
            Err(e) => {
                warn!(error = %e, timestamp, "seekToTime failed");
                SeekOutcome::Unreachable
            }
        }
    }

    pub async fn captions_available(&self) -> bool {
        match self.round_trip(BridgeRequest::GetCaptions).await {
            Ok(BridgeResponse::Captions(reply)) => reply.captions_available,
            Ok(other) => {
                warn!(got = other.kind(), "unexpected reply to getCaptions");
                false
            }
            Err(e) => {
                debug!(error = %e, "getCaptions failed");
                false
            }
        }
    }
}
