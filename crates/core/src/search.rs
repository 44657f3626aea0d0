use tracing::debug;

use crate::types::{SearchMatch, TranscriptSegment};

/// Case-insensitive substring search over a transcript.
///
/// Only the first occurrence per segment is reported and results keep
/// transcript order. `matched_text` and both context fields are sliced from the
/// lower-cased segment text; `text` keeps the original.
pub fn search(transcript: &[TranscriptSegment], query: &str) -> Vec<SearchMatch> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let term = query.to_lowercase();
    let matches: Vec<SearchMatch> = transcript
        .iter()
        .filter_map(|segment| match_segment(segment, &term))
        .collect();

    debug!(
        term = %term,
        segments = transcript.len(),
        matches = matches.len(),
        "transcript searched"
    );
    matches
}

fn match_segment(segment: &TranscriptSegment, term: &str) -> Option<SearchMatch> {
    let text = segment.text.to_lowercase();
    let index = text.find(term)?;
    let end = index + term.len();

    Some(SearchMatch {
        text: segment.text.clone(),
        timestamp: segment.start,
        matched_text: text[index..end].to_string(),
        context_before: text[..index].to_string(),
        context_after: text[end..].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::FixtureTranscripts;
    use proptest::prelude::*;

    fn segments(lines: &[(&str, f64)]) -> Vec<TranscriptSegment> {
        lines
            .iter()
            .map(|(text, start)| TranscriptSegment::new(*text, *start, 3.0))
            .collect()
    }

    #[test]
    fn blank_query_finds_nothing() {
        let transcript = segments(&[("hello there", 0.0)]);
        assert!(search(&transcript, "").is_empty());
        assert!(search(&transcript, "   \t").is_empty());
    }

    #[test]
    fn finds_strangers_in_demo_transcript() {
        let transcript = FixtureTranscripts::default().demo();
        let results = search(&transcript, "strangers");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].timestamp, 19.0);
        assert_eq!(results[0].text, "We're no strangers to love");
        assert_eq!(results[0].matched_text, "strangers");
        assert_eq!(results[0].context_before, "we're no ");
        assert_eq!(results[0].context_after, " to love");
    }

    #[test]
    fn reports_first_occurrence_only() {
        let transcript = segments(&[("Never gonna give you up, never gonna let you down", 43.0)]);
        let results = search(&transcript, "never");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].context_before, "");
        assert!(results[0].context_after.contains("never gonna let"));
    }

    #[test]
    fn keeps_transcript_order() {
        let transcript = segments(&[("love at 0", 0.0), ("nothing", 4.0), ("LOVE at 9", 9.0)]);
        let stamps: Vec<f64> = search(&transcript, "love").iter().map(|m| m.timestamp).collect();
        assert_eq!(stamps, vec![0.0, 9.0]);
    }

    #[test]
    fn match_fields_are_lower_cased() {
        let transcript = segments(&[("Hello World", 1.0)]);
        let results = search(&transcript, "WORLD");

        assert_eq!(results[0].matched_text, "world");
        assert_eq!(results[0].context_before, "hello ");
        assert_eq!(results[0].text, "Hello World");
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let transcript = FixtureTranscripts::default().generic();
        assert!(search(&transcript, "xylophone").is_empty());
    }

    proptest! {
        #[test]
        fn context_and_match_rebuild_the_segment(
            texts in prop::collection::vec("[a-zA-Z ,.']{0,40}", 0..12),
            query in "[a-zA-Z ]{1,4}",
        ) {
            let transcript: Vec<TranscriptSegment> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| TranscriptSegment::new(t.clone(), i as f64 * 2.0, 2.0))
                .collect();

            for m in search(&transcript, &query) {
                let rebuilt = format!("{}{}{}", m.context_before, m.matched_text, m.context_after);
                prop_assert_eq!(rebuilt, m.text.to_lowercase());
                prop_assert_eq!(m.matched_text.chars().count(), query.chars().count());
            }
        }

        #[test]
        fn search_ignores_query_case(
            texts in prop::collection::vec("[a-zA-Z ]{0,30}", 0..10),
            query in "[a-zA-Z]{1,3}",
        ) {
            let transcript: Vec<TranscriptSegment> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| TranscriptSegment::new(t.clone(), i as f64, 1.0))
                .collect();

            let upper: Vec<f64> = search(&transcript, &query.to_uppercase()).iter().map(|m| m.timestamp).collect();
            let lower: Vec<f64> = search(&transcript, &query.to_lowercase()).iter().map(|m| m.timestamp).collect();
            prop_assert_eq!(upper, lower);
        }
    }
}
