//! Browser native-messaging transport.
//!
//! Each message is a UTF-8 JSON document preceded by its byte length as a
//! native-endian `u32`. Messages are capped at 1 MiB, the browser's limit for
//! messages sent to the extension.

use async_trait::async_trait;
use serde::Serialize;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    sync::{mpsc, oneshot},
};
use tracing::{debug, warn};

use crate::{
    bridge::{BridgeRequest, BridgeResponse, HostBridge, HostError, PageAgent, TabId},
    error::Result,
};

pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Read one message body without decoding it. `Ok(None)` on a clean end of stream.
pub async fn read_frame_bytes<R>(reader: &mut R) -> std::result::Result<Option<Vec<u8>>, HostError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_ne_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(HostError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Read one message as JSON. `Ok(None)` on a clean end of stream.
pub async fn read_frame<R>(reader: &mut R) -> std::result::Result<Option<serde_json::Value>, HostError>
where
    R: AsyncRead + Unpin,
{
    match read_frame_bytes(reader).await? {
        Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
        None => Ok(None),
    }
}

pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> std::result::Result<(), HostError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(HostError::FrameTooLarge {
            len: body.len(),
            max: MAX_FRAME_LEN,
        });
    }

    writer.write_all(&(body.len() as u32).to_ne_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

struct StreamCall {
    request: BridgeRequest,
    reply: oneshot::Sender<std::result::Result<BridgeResponse, HostError>>,
}

/// Host bridge over a framed byte stream to a single page agent.
///
/// A pump task owns the stream and runs one request/response exchange at a
/// time to completion, so a caller that gives up mid-exchange never leaves a
/// reply behind for the next request.
pub struct StreamHost {
    tab: TabId,
    calls: mpsc::Sender<StreamCall>,
}

impl StreamHost {
    /// Spawn the pump for `reader`/`writer`. Needs a tokio runtime.
    pub fn new<R, W>(tab: TabId, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (calls, inbox) = mpsc::channel(16);
        tokio::spawn(pump(tab, reader, writer, inbox));
        Self { tab, calls }
    }
}

async fn exchange<R, W>(
    tab: TabId,
    reader: &mut R,
    writer: &mut W,
    request: &BridgeRequest,
) -> std::result::Result<BridgeResponse, HostError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_frame(writer, request).await?;
    let body = read_frame(reader)
        .await?
        .ok_or(HostError::NoResponse { tab })?;
    request.decode_response(body)
}

async fn pump<R, W>(tab: TabId, mut reader: R, mut writer: W, mut inbox: mpsc::Receiver<StreamCall>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(call) = inbox.recv().await {
        let result = exchange(tab, &mut reader, &mut writer, &call.request).await;
        // an oversized reply was left unread, later frames would be misaligned
        let desynced = matches!(result, Err(HostError::FrameTooLarge { .. }));

        if call.reply.send(result).is_err() {
            debug!(action = call.request.action(), "caller gave up before the reply arrived");
        }
        if desynced {
            warn!(%tab, "bridge stream out of sync, closing");
            break;
        }
    }
}

#[async_trait]
impl HostBridge for StreamHost {
    async fn active_tab(&self) -> std::result::Result<TabId, HostError> {
        Ok(self.tab)
    }

    async fn send(
        &self,
        tab: TabId,
        request: &BridgeRequest,
    ) -> std::result::Result<BridgeResponse, HostError> {
        if tab != self.tab {
            return Err(HostError::NoListener { tab });
        }

        let (reply, response) = oneshot::channel();
        self.calls
            .send(StreamCall {
                request: request.clone(),
                reply,
            })
            .await
            .map_err(|_| HostError::NoListener { tab })?;

        response.await.map_err(|_| HostError::NoResponse { tab })?
    }
}

/// Serve `agent` over a framed stream until the other side closes it.
///
/// Every frame gets exactly one reply; one that is not valid JSON or names an
/// unknown action gets an `{"error": ..}` object. Only IO and framing errors
/// end the loop.
pub async fn serve_agent<R, W>(agent: PageAgent, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(body) = read_frame_bytes(&mut reader).await? {
        match serde_json::from_slice::<BridgeRequest>(&body) {
            Ok(request) => write_frame(&mut writer, &agent.handle(&request)).await?,
            Err(e) => {
                warn!(error = %e, "unrecognized bridge request");
                let reply = serde_json::json!({ "error": e.to_string() });
                write_frame(&mut writer, &reply).await?;
            }
        }
    }

    debug!("bridge stream closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bridge::{CurrentTimeReply, PageState, VideoElement, VideoIdReply};
    use tokio::io::{duplex, split};

    fn spawn_agent(page: PageState) -> StreamHost {
        let (client, server) = duplex(4096);
        let (server_read, server_write) = split(server);
        tokio::spawn(serve_agent(PageAgent::new(page.shared()), server_read, server_write));

        let (client_read, client_write) = split(client);
        StreamHost::new(TabId(1), client_read, client_write)
    }

    #[tokio::test]
    async fn round_trips_requests_over_the_stream() {
        let mut page = PageState::watch_page("https://youtu.be/dQw4w9WgXcQ");
        page.video = Some(VideoElement::paused_at(12.0));
        let host = spawn_agent(page);

        let response = host.send(TabId(1), &BridgeRequest::GetVideoId).await.unwrap();
        assert_eq!(
            response,
            BridgeResponse::VideoId(VideoIdReply {
                video_id: Some("dQw4w9WgXcQ".to_string()),
                captions_available: true,
            })
        );

        let response = host.send(TabId(1), &BridgeRequest::GetCurrentTime).await.unwrap();
        assert_eq!(
            response,
            BridgeResponse::CurrentTime(CurrentTimeReply {
                current_time: 12.0,
                playing: false,
            })
        );
    }

    #[tokio::test]
    async fn closed_stream_is_no_response() {
        let (client, server) = duplex(64);
        drop(server);
        let (reader, writer) = split(client);
        let host = StreamHost::new(TabId(1), reader, writer);

        assert!(host.send(TabId(1), &BridgeRequest::GetCaptions).await.is_err());
    }

    #[tokio::test]
    async fn abandoned_request_does_not_leak_its_reply() {
        let (client, server) = duplex(4096);
        let (mut server_read, mut server_write) = split(server);
        let agent = PageAgent::new(PageState::watch_page("https://youtu.be/dQw4w9WgXcQ").shared());
        // answers every request 50 ms late
        tokio::spawn(async move {
            while let Ok(Some(body)) = read_frame(&mut server_read).await {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let request: BridgeRequest = serde_json::from_value(body).unwrap();
                write_frame(&mut server_write, &agent.handle(&request)).await.unwrap();
            }
        });

        let (client_read, client_write) = split(client);
        let host = StreamHost::new(TabId(1), client_read, client_write);

        let seek = BridgeRequest::SeekToTime { timestamp: 30.0 };
        let abandoned = tokio::time::timeout(Duration::from_millis(10), host.send(TabId(1), &seek)).await;
        assert!(abandoned.is_err());

        let response = host.send(TabId(1), &BridgeRequest::GetCurrentTime).await.unwrap();
        assert!(matches!(response, BridgeResponse::CurrentTime(_)));
    }

    #[tokio::test]
    async fn unknown_action_still_gets_a_reply() {
        let (mut client, server) = duplex(4096);
        let (server_read, server_write) = split(server);
        let page = PageState::blank("https://www.youtube.com/").shared();
        tokio::spawn(serve_agent(PageAgent::new(page), server_read, server_write));

        write_frame(&mut client, &serde_json::json!({ "action": "reload" }))
            .await
            .unwrap();
        let reply = read_frame(&mut client).await.unwrap().unwrap();
        assert!(reply.get("error").is_some());
    }

    #[tokio::test]
    async fn invalid_json_gets_a_reply_and_the_agent_keeps_serving() {
        let (mut client, server) = duplex(4096);
        let (server_read, server_write) = split(server);
        let page = PageState::watch_page("https://youtu.be/dQw4w9WgXcQ").shared();
        tokio::spawn(serve_agent(PageAgent::new(page), server_read, server_write));

        let garbage = b"{not json";
        client
            .write_all(&(garbage.len() as u32).to_ne_bytes())
            .await
            .unwrap();
        client.write_all(garbage).await.unwrap();
        let reply = read_frame(&mut client).await.unwrap().unwrap();
        assert!(reply.get("error").is_some());

        write_frame(&mut client, &BridgeRequest::GetCaptions).await.unwrap();
        let reply = read_frame(&mut client).await.unwrap().unwrap();
        assert_eq!(reply, serde_json::json!({ "captionsAvailable": true }));
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let (mut client, mut server) = duplex(64);
        let len = (MAX_FRAME_LEN as u32 + 1).to_ne_bytes();
        client.write_all(&len).await.unwrap();

        let err = read_frame(&mut server).await.unwrap_err();
        assert!(matches!(err, HostError::FrameTooLarge { .. }));
    }
}
