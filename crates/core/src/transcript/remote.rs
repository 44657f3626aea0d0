use async_trait::async_trait;
use tracing::debug;

use crate::{
    transcript::{TranscriptError, TranscriptSource},
    types::TranscriptSegment,
};

/// Transcript service client: `GET {endpoint}/api/transcript/{videoId}`.
///
/// No request timeout is set.
pub struct RemoteTranscripts {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteTranscripts {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn transcript_url(&self, video_id: &str) -> String {
        format!("{}/api/transcript/{}", self.endpoint, video_id)
    }
}

#[async_trait]
impl TranscriptSource for RemoteTranscripts {
    async fn transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let url = self.transcript_url(video_id);
        debug!(%url, "fetching transcript");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TranscriptError::BadStatus {
                video_id: video_id.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.json::<serde_json::Value>().await?;
        parse_segments(video_id, body)
    }
}

/// Validate a service response body into segments, preserving its order.
pub fn parse_segments(
    video_id: &str,
    body: serde_json::Value,
) -> Result<Vec<TranscriptSegment>, TranscriptError> {
    let malformed = |reason: String| TranscriptError::Malformed {
        video_id: video_id.to_string(),
        reason,
    };

    let serde_json::Value::Array(items) = body else {
        return Err(malformed("response is not an array".to_string()));
    };
    if items.is_empty() {
        return Err(TranscriptError::Empty {
            video_id: video_id.to_string(),
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let segment: TranscriptSegment = serde_json::from_value(item)
                .map_err(|e| malformed(format!("item {}: {}", i, e)))?;
            if !segment.is_well_formed() {
                return Err(malformed(format!(
                    "item {} has start={} duration={}",
                    i, segment.start, segment.duration
                )));
            }
            Ok(segment)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_url_without_double_slash() {
        let remote = RemoteTranscripts::new("http://localhost:8080/");
        assert_eq!(
            remote.transcript_url("dQw4w9WgXcQ"),
            "http://localhost:8080/api/transcript/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn parses_well_formed_array_in_order() {
        let body = json!([
            { "text": "first", "start": 0.0, "duration": 1.5 },
            { "text": "second", "start": 1.5, "duration": 2.0, "lang": "en" },
        ]);
        let segments = parse_segments("abc", body).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "first");
        assert_eq!(segments[1].start, 1.5);
    }

    #[test]
    fn rejects_non_array_bodies() {
        let err = parse_segments("abc", json!({ "error": "not found" })).unwrap_err();
        assert!(matches!(err, TranscriptError::Malformed { .. }));
    }

    #[test]
    fn rejects_empty_arrays() {
        let err = parse_segments("abc", json!([])).unwrap_err();
        assert!(matches!(err, TranscriptError::Empty { .. }));
    }

    #[test]
    fn rejects_items_with_bad_timing() {
        let body = json!([{ "text": "x", "start": -1.0, "duration": 1.0 }]);
        assert!(parse_segments("abc", body).is_err());

        let body = json!([{ "text": "x", "start": 1.0 }]);
        assert!(parse_segments("abc", body).is_err());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        // nothing listens on the discard port
        let remote = RemoteTranscripts::new("http://127.0.0.1:9");
        assert!(remote.transcript("dQw4w9WgXcQ").await.is_err());
    }
}
