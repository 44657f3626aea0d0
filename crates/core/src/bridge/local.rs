use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::bridge::{
    BridgeRequest, BridgeResponse, HostBridge, HostError, TabId,
    agent::{PageAgent, PendingRequest},
};

/// In-process host: the active tab is a channel to a listening page agent.
pub struct LocalHost {
    active: Option<(TabId, mpsc::Sender<PendingRequest>)>,
}

impl LocalHost {
    /// Spawn `agent` as the listener of the active tab. Needs a tokio runtime.
    pub fn attach(agent: PageAgent) -> Self {
        let (host, inbox) = Self::with_inbox(TabId(1));
        tokio::spawn(agent.listen(inbox));
        host
    }

    /// An active tab whose requests are handed to the returned receiver.
    pub fn with_inbox(tab: TabId) -> (Self, mpsc::Receiver<PendingRequest>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Self {
                active: Some((tab, tx)),
            },
            rx,
        )
    }

    /// A browser window with no active tab.
    pub fn without_tab() -> Self {
        Self { active: None }
    }

    /// An active tab where no content script is listening.
    pub fn without_listener() -> Self {
        let (host, _inbox) = Self::with_inbox(TabId(1));
        host
    }
}

#[async_trait]
impl HostBridge for LocalHost {
    async fn active_tab(&self) -> Result<TabId, HostError> {
        self.active
            .as_ref()
            .map(|(tab, _)| *tab)
            .ok_or(HostError::NoActiveTab)
    }

    async fn send(&self, tab: TabId, request: &BridgeRequest) -> Result<BridgeResponse, HostError> {
        let inbox = match &self.active {
            Some((active, inbox)) if *active == tab => inbox,
            _ => return Err(HostError::NoListener { tab }),
        };

        let (reply, response) = oneshot::channel();
        inbox
            .send(PendingRequest {
                request: request.clone(),
                reply,
            })
            .await
            .map_err(|_| HostError::NoListener { tab })?;

        response.await.map_err(|_| HostError::NoResponse { tab })
    }
}

/// Stand-in for running outside a browser: no messaging capability at all.
pub struct UnavailableHost;

#[async_trait]
impl HostBridge for UnavailableHost {
    fn is_available(&self) -> bool {
        false
    }

    async fn active_tab(&self) -> Result<TabId, HostError> {
        Err(HostError::Unavailable)
    }

    async fn send(&self, _tab: TabId, _request: &BridgeRequest) -> Result<BridgeResponse, HostError> {
        Err(HostError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{PageState, SeekReply};

    #[tokio::test]
    async fn attached_agent_answers() {
        let page = PageState::watch_page("https://www.youtube.com/watch?v=dQw4w9WgXcQ").shared();
        let host = LocalHost::attach(PageAgent::new(page));

        let tab = host.active_tab().await.unwrap();
        let response = host
            .send(tab, &BridgeRequest::SeekToTime { timestamp: 5.0 })
            .await
            .unwrap();
        assert_eq!(response, BridgeResponse::Seek(SeekReply { success: true }));
    }

    #[tokio::test]
    async fn missing_tab_and_listener_are_errors() {
        let err = LocalHost::without_tab().active_tab().await.unwrap_err();
        assert!(matches!(err, HostError::NoActiveTab));

        let host = LocalHost::without_listener();
        let tab = host.active_tab().await.unwrap();
        let err = host.send(tab, &BridgeRequest::GetVideoId).await.unwrap_err();
        assert!(matches!(err, HostError::NoListener { .. }));
    }

    #[tokio::test]
    async fn dropped_reply_is_no_response() {
        let (host, mut inbox) = LocalHost::with_inbox(TabId(7));
        tokio::spawn(async move {
            while let Some(pending) = inbox.recv().await {
                drop(pending.reply);
            }
        });

        let err = host
            .send(TabId(7), &BridgeRequest::GetCaptions)
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::NoResponse { tab: TabId(7) }));
    }
}
