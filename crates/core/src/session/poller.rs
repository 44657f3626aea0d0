use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::debug;

use super::SessionController;

/// Background task refreshing the session's playback position.
///
/// Stops on its own once the player reports it is paused or stops answering.
/// Dropping the poller aborts the task.
pub struct PlaybackPoller {
    task: JoinHandle<()>,
}

impl PlaybackPoller {
    pub fn start(session: Arc<SessionController>, every: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match session.refresh_playback().await {
                    Some(sample) if sample.playing => continue,
                    Some(sample) => {
                        debug!(current_time = sample.current_time, "playback paused");
                        break;
                    }
                    None => {
                        debug!("player stopped answering");
                        break;
                    }
                }
            }
        });
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the poller to stop by itself.
    pub async fn join(mut self) {
        let _ = (&mut self.task).await;
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PlaybackPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
