use async_trait::async_trait;

use crate::{
    config::DEFAULT_DEMO_VIDEO_ID,
    transcript::{TranscriptError, TranscriptSource},
    types::TranscriptSegment,
};

/// (text, start, duration)
type Line = (&'static str, f64, f64);

static DEMO_TRANSCRIPT: &[Line] = &[
    ("We're no strangers to love", 19.0, 4.0),
    ("You know the rules and so do I", 23.0, 4.0),
    ("A full commitment's what I'm thinking of", 27.0, 4.0),
    ("You wouldn't get this from any other guy", 31.0, 4.0),
    ("I just wanna tell you how I'm feeling", 35.0, 4.0),
    ("Gotta make you understand", 39.0, 4.0),
    ("Never gonna give you up, never gonna let you down", 43.0, 5.0),
    ("Never gonna run around and desert you", 48.0, 4.0),
    ("Never gonna make you cry, never gonna say goodbye", 52.0, 5.0),
    ("Never gonna tell a lie and hurt you", 57.0, 4.0),
    ("We've known each other for so long", 61.0, 4.0),
    ("Your heart's been aching but you're too shy to say it", 65.0, 5.0),
    ("Inside we both know what's been going on", 70.0, 4.0),
    ("We know the game and we're gonna play it", 74.0, 4.0),
    ("And if you ask me how I'm feeling", 78.0, 4.0),
    ("Don't tell me you're too blind to see", 82.0, 4.0),
    ("Never gonna give you up, never gonna let you down", 86.0, 5.0),
    ("Never gonna run around and desert you", 91.0, 4.0),
    ("Never gonna make you cry, never gonna say goodbye", 95.0, 5.0),
    ("Never gonna tell a lie and hurt you", 100.0, 4.0),
];

static GENERIC_TRANSCRIPT: &[Line] = &[
    ("Hello everyone and welcome to this video.", 0.0, 3.0),
    ("Today we're going to be talking about some interesting topics.", 3.0, 4.0),
    ("I'm really feeling excited about sharing this with you all.", 7.0, 3.0),
    ("Let's dive right into the content of this video.", 10.0, 3.0),
    ("First, we're going to explore the main concepts.", 13.0, 3.0),
    ("Then we'll look at some practical examples.", 16.0, 3.0),
    ("It's important to understand the basics before moving forward.", 19.0, 4.0),
    ("Many people find this topic challenging at first.", 23.0, 3.0),
    ("But don't worry, I'll explain everything step by step.", 26.0, 4.0),
    ("You'll be feeling confident about this by the end of the video.", 30.0, 4.0),
    ("Let me know in the comments if you have any questions.", 34.0, 3.0),
    ("And don't forget to like and subscribe if you find this helpful.", 37.0, 4.0),
    ("This helps the channel grow and allows me to make more content.", 41.0, 4.0),
    ("Now, let's continue with the next section of our discussion.", 45.0, 4.0),
    ("This part is particularly interesting and useful.", 49.0, 3.0),
    ("I'm feeling that this information will really help you in your projects.", 52.0, 4.0),
    ("Remember to take notes if something seems especially relevant to you.", 56.0, 4.0),
    ("We're almost at the end of this video now.", 60.0, 3.0),
    ("Thank you for watching all the way through.", 63.0, 3.0),
    ("I hope you're feeling more knowledgeable about this topic now.", 66.0, 4.0),
    ("See you in the next video!", 70.0, 2.0),
];

fn to_segments(lines: &[Line]) -> Vec<TranscriptSegment> {
    lines
        .iter()
        .map(|&(text, start, duration)| TranscriptSegment::new(text, start, duration))
        .collect()
}

/// Local transcripts used when the service cannot answer.
///
/// Only the demo video has a real transcript; every other ID gets the same
/// generic one, so results for those are not specific to the video.
#[derive(Debug, Clone)]
pub struct FixtureTranscripts {
    demo_video_id: String,
}

impl Default for FixtureTranscripts {
    fn default() -> Self {
        Self::new(DEFAULT_DEMO_VIDEO_ID)
    }
}

impl FixtureTranscripts {
    pub fn new(demo_video_id: impl Into<String>) -> Self {
        Self {
            demo_video_id: demo_video_id.into(),
        }
    }

    pub fn demo_video_id(&self) -> &str {
        &self.demo_video_id
    }

    pub fn for_video(&self, video_id: &str) -> Vec<TranscriptSegment> {
        if video_id == self.demo_video_id {
            self.demo()
        } else {
            self.generic()
        }
    }

    pub fn demo(&self) -> Vec<TranscriptSegment> {
        to_segments(DEMO_TRANSCRIPT)
    }

    pub fn generic(&self) -> Vec<TranscriptSegment> {
        to_segments(GENERIC_TRANSCRIPT)
    }
}

#[async_trait]
impl TranscriptSource for FixtureTranscripts {
    async fn transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        Ok(self.for_video(video_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_chronological_and_well_formed() {
        let fixtures = FixtureTranscripts::default();
        for transcript in [fixtures.demo(), fixtures.generic()] {
            assert!(!transcript.is_empty());
            assert!(transcript.iter().all(TranscriptSegment::is_well_formed));
            assert!(transcript.windows(2).all(|w| w[0].start <= w[1].start));
        }
    }

    #[test]
    fn configured_demo_id_selects_curated_transcript() {
        let fixtures = FixtureTranscripts::new("zzzzzzzzzzz");
        assert_eq!(fixtures.for_video("zzzzzzzzzzz"), fixtures.demo());
        assert_eq!(fixtures.for_video(DEFAULT_DEMO_VIDEO_ID), fixtures.generic());
    }
}
