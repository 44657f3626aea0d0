//! Messages exchanged between the extension UI and the page agent.
//!
//! Requests are tagged by `action`; each response is a plain object whose
//! shape depends on the action, so decoding needs the originating request.

use serde::{Deserialize, Serialize};

use crate::bridge::HostError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BridgeRequest {
    GetVideoId,
    GetCurrentTime,
    SeekToTime { timestamp: f64 },
    GetCaptions,
}

impl BridgeRequest {
    pub fn action(&self) -> &'static str {
        match self {
            BridgeRequest::GetVideoId => "getVideoId",
            BridgeRequest::GetCurrentTime => "getCurrentTime",
            BridgeRequest::SeekToTime { .. } => "seekToTime",
            BridgeRequest::GetCaptions => "getCaptions",
        }
    }

    /// Decode a raw response body as the reply to this request.
    pub fn decode_response(&self, body: serde_json::Value) -> Result<BridgeResponse, HostError> {
        let response = match self {
            BridgeRequest::GetVideoId => BridgeResponse::VideoId(serde_json::from_value(body)?),
            BridgeRequest::GetCurrentTime => {
                BridgeResponse::CurrentTime(serde_json::from_value(body)?)
            }
            BridgeRequest::SeekToTime { .. } => BridgeResponse::Seek(serde_json::from_value(body)?),
            BridgeRequest::GetCaptions => BridgeResponse::Captions(serde_json::from_value(body)?),
        };
        Ok(response)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIdReply {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub captions_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTimeReply {
    pub current_time: f64,
    #[serde(default)]
    pub playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekReply {
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionsReply {
    pub captions_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    VideoId(VideoIdReply),
    CurrentTime(CurrentTimeReply),
    Seek(SeekReply),
    Captions(CaptionsReply),
}

impl BridgeResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeResponse::VideoId(_) => "videoId",
            BridgeResponse::CurrentTime(_) => "currentTime",
            BridgeResponse::Seek(_) => "seek",
            BridgeResponse::Captions(_) => "captions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_use_action_tag() {
        assert_eq!(
            serde_json::to_value(BridgeRequest::GetVideoId).unwrap(),
            json!({ "action": "getVideoId" })
        );
        assert_eq!(
            serde_json::to_value(BridgeRequest::SeekToTime { timestamp: 19.0 }).unwrap(),
            json!({ "action": "seekToTime", "timestamp": 19.0 })
        );
    }

    #[test]
    fn parses_requests_from_the_page_side() {
        let request: BridgeRequest =
            serde_json::from_value(json!({ "action": "getCaptions" })).unwrap();
        assert_eq!(request, BridgeRequest::GetCaptions);
        assert!(serde_json::from_value::<BridgeRequest>(json!({ "action": "reload" })).is_err());
    }

    #[test]
    fn decodes_reply_by_originating_action() {
        let body = json!({ "captionsAvailable": true });

        let as_captions = BridgeRequest::GetCaptions.decode_response(body.clone()).unwrap();
        assert_eq!(
            as_captions,
            BridgeResponse::Captions(CaptionsReply { captions_available: true })
        );

        // same body read as a getVideoId reply: no id reported
        let as_video = BridgeRequest::GetVideoId.decode_response(body).unwrap();
        assert_eq!(
            as_video,
            BridgeResponse::VideoId(VideoIdReply {
                video_id: None,
                captions_available: true
            })
        );
    }

    #[test]
    fn legacy_time_reply_without_playing_flag() {
        let reply = BridgeRequest::GetCurrentTime
            .decode_response(json!({ "currentTime": 42.5 }))
            .unwrap();
        assert_eq!(
            reply,
            BridgeResponse::CurrentTime(CurrentTimeReply {
                current_time: 42.5,
                playing: false
            })
        );
    }

    #[test]
    fn malformed_reply_is_an_error() {
        let err = BridgeRequest::GetCurrentTime
            .decode_response(json!({ "currentTime": "soon" }))
            .unwrap_err();
        assert!(matches!(err, HostError::Json(_)));
    }
}
