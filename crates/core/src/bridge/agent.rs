use std::sync::{Arc, Mutex};

use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tracing::{debug, warn};
use url::Url;

use crate::bridge::protocol::{
    BridgeRequest, BridgeResponse, CaptionsReply, CurrentTimeReply, SeekReply, VideoIdReply,
};

pub const VIDEO_ID_LEN: usize = 11;

/// The page's `<video>` element. Position advances with the clock while playing.
#[derive(Debug, Clone)]
pub struct VideoElement {
    position: f64,
    duration: Option<f64>,
    playing_since: Option<Instant>,
}

impl VideoElement {
    pub fn paused_at(position: f64) -> Self {
        Self {
            position,
            duration: None,
            playing_since: None,
        }
    }

    pub fn playing_from(position: f64) -> Self {
        Self {
            position,
            duration: None,
            playing_since: Some(Instant::now()),
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn current_time(&self) -> f64 {
        let elapsed = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        self.clamp(self.position + elapsed)
    }

    /// Playing and not yet at the end.
    pub fn is_playing(&self) -> bool {
        match (self.playing_since, self.duration) {
            (None, _) => false,
            (Some(_), Some(duration)) => self.current_time() < duration,
            (Some(_), None) => true,
        }
    }

    pub fn seek(&mut self, timestamp: f64) {
        self.position = self.clamp(timestamp);
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }

    pub fn play(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        self.position = self.current_time();
        self.playing_since = None;
    }

    fn clamp(&self, t: f64) -> f64 {
        let t = t.max(0.0);
        match self.duration {
            Some(duration) => t.min(duration),
            None => t,
        }
    }
}

/// The player's subtitles toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionButton {
    pub disabled: bool,
}

#[derive(Debug, Clone)]
pub struct PageState {
    pub url: String,
    pub video: Option<VideoElement>,
    pub caption_button: Option<CaptionButton>,
}

pub type SharedPage = Arc<Mutex<PageState>>;

impl PageState {
    /// A watch page with a paused video and captions enabled.
    pub fn watch_page(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            video: Some(VideoElement::paused_at(0.0)),
            caption_button: Some(CaptionButton { disabled: false }),
        }
    }

    /// A page without any player.
    pub fn blank(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            video: None,
            caption_button: None,
        }
    }

    pub fn shared(self) -> SharedPage {
        Arc::new(Mutex::new(self))
    }
}

/// Pull an 11-character video ID out of a YouTube URL.
///
/// Strategies in order: `?v=` query parameter, `youtu.be/<id>`,
/// `/embed/<id>`. The first one producing an ID of the right length wins.
pub fn extract_video_id(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let strategies: [fn(&Url) -> Option<String>; 3] =
        [from_query_param, from_short_link, from_embed_path];

    strategies
        .iter()
        .filter_map(|strategy| strategy(&url))
        .find(|id| id.len() == VIDEO_ID_LEN)
}

fn from_query_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

fn from_short_link(url: &Url) -> Option<String> {
    if url.host_str() != Some("youtu.be") {
        return None;
    }
    url.path_segments()?
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn from_embed_path(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == "embed")?;
    segments.next().map(str::to_string)
}

/// A request waiting for the agent, paired with the slot for its one reply.
pub struct PendingRequest {
    pub request: BridgeRequest,
    pub reply: oneshot::Sender<BridgeResponse>,
}

/// Page-side handler. Every action is a function of the current page state
/// and always yields a response, falling back to defaults on internal errors.
#[derive(Clone)]
pub struct PageAgent {
    page: SharedPage,
}

impl PageAgent {
    pub fn new(page: SharedPage) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    pub fn handle(&self, request: &BridgeRequest) -> BridgeResponse {
        debug!(action = request.action(), "page agent request");
        match request {
            BridgeRequest::GetVideoId => BridgeResponse::VideoId(self.video_id()),
            BridgeRequest::GetCurrentTime => BridgeResponse::CurrentTime(self.current_time()),
            BridgeRequest::SeekToTime { timestamp } => BridgeResponse::Seek(self.seek(*timestamp)),
            BridgeRequest::GetCaptions => BridgeResponse::Captions(self.captions()),
        }
    }

    /// Answer requests from `inbox` until every sender is gone.
    pub async fn listen(self, mut inbox: mpsc::Receiver<PendingRequest>) {
        while let Some(pending) = inbox.recv().await {
            let response = self.handle(&pending.request);
            if pending.reply.send(response).is_err() {
                debug!("caller dropped before the response arrived");
            }
        }
    }

    fn with_page<T>(&self, default: T, f: impl FnOnce(&mut PageState) -> T) -> T {
        match self.page.lock() {
            Ok(mut page) => f(&mut page),
            Err(_) => {
                warn!("page state poisoned, answering with default");
                default
            }
        }
    }

    fn video_id(&self) -> VideoIdReply {
        let default = VideoIdReply {
            video_id: None,
            captions_available: false,
        };
        self.with_page(default, |page| VideoIdReply {
            video_id: extract_video_id(&page.url),
            captions_available: captions_enabled(page),
        })
    }

    fn current_time(&self) -> CurrentTimeReply {
        let default = CurrentTimeReply {
            current_time: 0.0,
            playing: false,
        };
        self.with_page(default, |page| match &page.video {
            Some(video) if video.current_time().is_finite() => CurrentTimeReply {
                current_time: video.current_time(),
                playing: video.is_playing(),
            },
            _ => default,
        })
    }

    fn seek(&self, timestamp: f64) -> SeekReply {
        self.with_page(SeekReply { success: false }, |page| match page.video.as_mut() {
            Some(video) => {
                video.seek(timestamp);
                video.play();
                SeekReply { success: true }
            }
            None => {
                debug!(timestamp, "seek requested but the page has no video element");
                SeekReply { success: false }
            }
        })
    }

    fn captions(&self) -> CaptionsReply {
        self.with_page(
            CaptionsReply {
                captions_available: false,
            },
            |page| CaptionsReply {
                captions_available: captions_enabled(page),
            },
        )
    }
}

fn captions_enabled(page: &PageState) -> bool {
    page.caption_button
        .map(|button| !button.disabled)
        .unwrap_or(false)
}
