use tracing::{info, warn};

use crate::{bridge::PlayerProxy, types::VideoIdentity};

/// Result of asking the page which video it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub identity: VideoIdentity,
    /// Caption availability observed while resolving; `None` if the page was not reached.
    pub captions_available: Option<bool>,
}

pub struct VideoIdentityResolver {
    proxy: PlayerProxy,
    fallback_video_id: String,
}

impl VideoIdentityResolver {
    pub fn new(proxy: PlayerProxy, fallback_video_id: impl Into<String>) -> Self {
        Self {
            proxy,
            fallback_video_id: fallback_video_id.into(),
        }
    }

    pub fn fallback_video_id(&self) -> &str {
        &self.fallback_video_id
    }

    pub async fn resolve(&self) -> Resolution {
        if !self.proxy.host_available() {
            info!(video_id = %self.fallback_video_id, "no browser host, using demo video");
            return self.fallback(None);
        }

        match self.proxy.video_probe().await {
            Some(reply) => match reply.video_id {
                Some(video_id) => {
                    info!(%video_id, "resolved current video");
                    Resolution {
                        identity: VideoIdentity::resolved(video_id),
                        captions_available: Some(reply.captions_available),
                    }
                }
                None => {
                    info!("page is not a video page, using demo video");
                    self.fallback(Some(reply.captions_available))
                }
            },
            None => {
                warn!("page agent unreachable, using demo video");
                self.fallback(None)
            }
        }
    }

    pub async fn resolve_current_video_id(&self) -> VideoIdentity {
        self.resolve().await.identity
    }

    fn fallback(&self, captions_available: Option<bool>) -> Resolution {
        Resolution {
            identity: VideoIdentity::fallback(self.fallback_video_id.clone()),
            captions_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bridge::{LocalHost, PageAgent, PageState, UnavailableHost};

    fn resolver_for(page: PageState) -> VideoIdentityResolver {
        let host = LocalHost::attach(PageAgent::new(page.shared()));
        VideoIdentityResolver::new(PlayerProxy::new(Arc::new(host)), "dQw4w9WgXcQ")
    }

    #[tokio::test]
    async fn outside_a_host_resolves_to_fallback() {
        let resolver =
            VideoIdentityResolver::new(PlayerProxy::new(Arc::new(UnavailableHost)), "dQw4w9WgXcQ");

        let identity = resolver.resolve_current_video_id().await;
        assert_eq!(identity, VideoIdentity::fallback("dQw4w9WgXcQ"));
        assert!(identity.is_fallback);
    }

    #[tokio::test]
    async fn unreachable_agent_resolves_to_fallback() {
        let resolver = VideoIdentityResolver::new(
            PlayerProxy::new(Arc::new(LocalHost::without_listener())),
            "dQw4w9WgXcQ",
        );
        let resolution = resolver.resolve().await;
        assert!(resolution.identity.is_fallback);
        assert_eq!(resolution.captions_available, None);
    }

    #[tokio::test]
    async fn page_video_is_reported_with_captions() {
        let resolver = resolver_for(PageState::watch_page(
            "https://www.youtube.com/watch?v=9bZkp7q19f0",
        ));
        let resolution = resolver.resolve().await;

        assert_eq!(resolution.identity, VideoIdentity::resolved("9bZkp7q19f0"));
        assert_eq!(resolution.captions_available, Some(true));
    }

    #[tokio::test]
    async fn non_video_page_resolves_to_fallback() {
        let resolver = resolver_for(PageState::blank("https://www.youtube.com/feed/trending"));
        let resolution = resolver.resolve().await;

        assert!(resolution.identity.is_fallback);
        assert_eq!(resolution.identity.video_id, "dQw4w9WgXcQ");
    }
}
