//! Messaging boundary between the extension UI and the page it controls.
//!
//! [`HostBridge`] is the browser's messaging capability (tab lookup plus
//! request/response delivery). [`PageAgent`] answers requests inside the page,
//! [`PlayerProxy`] is the UI-side caller that degrades to defaults on failure.

pub mod agent;
pub mod local;
pub mod protocol;
pub mod proxy;
pub mod stream;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use agent::{CaptionButton, PageAgent, PageState, SharedPage, VideoElement};
pub use local::{LocalHost, UnavailableHost};
pub use protocol::{
    BridgeRequest, BridgeResponse, CaptionsReply, CurrentTimeReply, SeekReply, VideoIdReply,
};
pub use proxy::{PlaybackSample, PlayerProxy, SeekOutcome};
pub use stream::{StreamHost, serve_agent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host messaging capability is not available")]
    Unavailable,

    #[error("no active tab in the current window")]
    NoActiveTab,

    #[error("tab {tab} has no listening page agent")]
    NoListener { tab: TabId },

    #[error("page agent in tab {tab} closed the channel without responding")]
    NoResponse { tab: TabId },

    #[error("unexpected {got} response to {action}")]
    UnexpectedResponse {
        action: &'static str,
        got: &'static str,
    },

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The browser messaging host as seen from the extension UI.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// False when running outside a host with messaging support.
    fn is_available(&self) -> bool {
        true
    }

    /// The single active tab of the focused window.
    async fn active_tab(&self) -> Result<TabId, HostError>;

    /// Deliver one request and wait for its one response.
    async fn send(&self, tab: TabId, request: &BridgeRequest) -> Result<BridgeResponse, HostError>;
}
