use std::sync::Arc;

use async_trait::async_trait;
use console::style;
use wordjump_core::{
    bridge::SeekOutcome,
    events::{EnrichedEvent, EventBus, downcast_ref},
    format::format_time,
    queues::QueueKind,
    session::{PlaybackTimeUpdated, SearchCompleted, SearchOutcome, SeekFailed, VideoResolved},
    workers::{SubscriptionSpec, Worker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Renders session events as terminal toasts, or one JSON object per line.
pub struct FeedbackSinkWorker {
    mode: OutputMode,
}

impl FeedbackSinkWorker {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    fn print_json(&self, event: &EnrichedEvent) -> anyhow::Result<()> {
        let line = serde_json::json!({
            "type": event.event.event_type(),
            "seq": event.ingest_seq,
            "event": serde_json::to_value(&*event.event)?,
        });
        println!("{line}");
        Ok(())
    }

    fn toast(&self, event: &EnrichedEvent) {
        if let Some(resolved) = downcast_ref::<VideoResolved>(&event.event) {
            let id = &resolved.identity.video_id;
            if resolved.identity.is_fallback {
                println!(
                    "{} Not on a YouTube page, searching demo video {}",
                    style("!").yellow().bold(),
                    style(id).cyan()
                );
            } else {
                println!("{} Video {}", style("✓").green().bold(), style(id).cyan());
            }
            if resolved.captions_available == Some(false) {
                println!(
                    "{} Captions look disabled for this video, results may be empty",
                    style("!").yellow().bold()
                );
            }
            return;
        }

        if let Some(done) = downcast_ref::<SearchCompleted>(&event.event) {
            match done.outcome {
                SearchOutcome::MatchesFound => println!(
                    "{} {} match(es) for \"{}\"",
                    style("✓").green().bold(),
                    done.match_count,
                    done.term
                ),
                SearchOutcome::NoMatches => println!(
                    "{} No matches for \"{}\"",
                    style("·").dim(),
                    done.term
                ),
                SearchOutcome::FetchError => println!(
                    "{} Could not load the transcript for {}",
                    style("✗").red().bold(),
                    done.video_id
                ),
            }
            return;
        }

        if let Some(failed) = downcast_ref::<SeekFailed>(&event.event) {
            let reason = match failed.outcome {
                SeekOutcome::NoVideoElement => "no video on the page",
                SeekOutcome::Unreachable => "page not reachable",
                SeekOutcome::InvalidTarget => "invalid timestamp",
                SeekOutcome::Seeked => return,
            };
            println!(
                "{} Could not jump to {} ({reason})",
                style("✗").red().bold(),
                format_time(failed.timestamp)
            );
            return;
        }

        if let Some(tick) = downcast_ref::<PlaybackTimeUpdated>(&event.event) {
            let marker = if tick.playing { "▶" } else { "⏸" };
            println!(
                "{} {}",
                style(marker).cyan(),
                style(format_time(tick.current_time)).dim()
            );
        }
    }
}

#[async_trait]
impl Worker for FeedbackSinkWorker {
    const SUBSCRIBER_ID: &'static str = "cli.feedback_sink";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec::new(Self::SUBSCRIBER_ID)
            .input(VideoResolved::EVENT_TYPE, QueueKind::FifoDropOldest { capacity: 4 })
            .input(SearchCompleted::EVENT_TYPE, QueueKind::FifoDropOldest { capacity: 8 })
            .input(SeekFailed::EVENT_TYPE, QueueKind::FifoDropOldest { capacity: 8 })
            .input(PlaybackTimeUpdated::EVENT_TYPE, QueueKind::Latest1)
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, _bus: &EventBus) -> anyhow::Result<()> {
        match self.mode {
            OutputMode::Json => self.print_json(&event)?,
            OutputMode::Human => self.toast(&event),
        }
        Ok(())
    }
}
