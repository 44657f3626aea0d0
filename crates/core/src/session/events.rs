//! Signals the session publishes for the UI to render.

use serde::Serialize;

use crate::{
    bridge::SeekOutcome,
    events::EventHeader,
    header_event,
    types::VideoIdentity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    MatchesFound,
    NoMatches,
    FetchError,
}

#[derive(Clone, Debug, Serialize)]
pub struct VideoResolved {
    #[serde(flatten)]
    pub header: EventHeader,
    pub identity: VideoIdentity,
    pub captions_available: Option<bool>,
}

impl VideoResolved {
    pub const EVENT_TYPE: &'static str = "session.video_resolved";

    pub fn new(identity: VideoIdentity, captions_available: Option<bool>) -> Self {
        Self {
            header: EventHeader::new(),
            identity,
            captions_available,
        }
    }
}

header_event!(VideoResolved);

#[derive(Clone, Debug, Serialize)]
pub struct SearchCompleted {
    #[serde(flatten)]
    pub header: EventHeader,
    pub video_id: String,
    pub term: String,
    pub outcome: SearchOutcome,
    pub match_count: usize,
}

impl SearchCompleted {
    pub const EVENT_TYPE: &'static str = "session.search_completed";

    pub fn new(video_id: String, term: String, outcome: SearchOutcome, match_count: usize) -> Self {
        Self {
            header: EventHeader::new(),
            video_id,
            term,
            outcome,
            match_count,
        }
    }
}

header_event!(SearchCompleted);

#[derive(Clone, Debug, Serialize)]
pub struct SeekFailed {
    #[serde(flatten)]
    pub header: EventHeader,
    pub timestamp: f64,
    pub outcome: SeekOutcome,
}

impl SeekFailed {
    pub const EVENT_TYPE: &'static str = "session.seek_failed";

    pub fn new(timestamp: f64, outcome: SeekOutcome) -> Self {
        Self {
            header: EventHeader::new(),
            timestamp,
            outcome,
        }
    }
}

header_event!(SeekFailed);

#[derive(Clone, Debug, Serialize)]
pub struct PlaybackTimeUpdated {
    #[serde(flatten)]
    pub header: EventHeader,
    pub current_time: f64,
    pub playing: bool,
}

impl PlaybackTimeUpdated {
    pub const EVENT_TYPE: &'static str = "session.playback_time_updated";

    pub fn new(current_time: f64, playing: bool) -> Self {
        Self {
            header: EventHeader::new(),
            current_time,
            playing,
        }
    }
}

header_event!(PlaybackTimeUpdated);
