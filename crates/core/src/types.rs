use serde::{Deserialize, Serialize};

/// A timed piece of captioned text. `start` and `duration` are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite()
            && self.start >= 0.0
            && self.duration.is_finite()
            && self.duration > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    /// Full segment text, original casing.
    pub text: String,
    pub timestamp: f64,
    pub matched_text: String,
    pub context_before: String,
    pub context_after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIdentity {
    pub video_id: String,
    /// True when the real page could not be reached and the demo video stands in.
    pub is_fallback: bool,
}

impl VideoIdentity {
    pub fn resolved(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            is_fallback: false,
        }
    }

    pub fn fallback(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            is_fallback: true,
        }
    }
}
