use futures::future::{poll_fn, select, Either};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use gloo_net::websocket::{futures::WebSocket, Message as WsMessage, State};
use gloo_timers::future::TimeoutFuture;
use medseek_types::{ClientError, ClientFrame};

/// Open a socket and wait until it is ready, or fail after `timeout_ms`
pub async fn connect(url: &str, timeout_ms: u32) -> Result<(WsSender, WsReceiver), ClientError> {
    log::info!("Connecting to WebSocket: {}", url);
    let mut ws = WebSocket::open(url).map_err(|e| ClientError::network("Failed to connect", e))?;

    // The sink only becomes ready once the socket has left CONNECTING
    let opened = {
        let ready = poll_fn(|cx| SinkExt::<WsMessage>::poll_ready_unpin(&mut ws, cx));
        futures::pin_mut!(ready);
        match select(ready, TimeoutFuture::new(timeout_ms)).await {
            Either::Left((result, _)) => result.map(|_| true),
            Either::Right(_) => Ok(false),
        }
    };

    match opened {
        Ok(true) if matches!(ws.state(), State::Open) => {
            let (sink, stream) = ws.split();
            Ok((WsSender { sink }, WsReceiver { stream }))
        }
        Ok(true) => Err(ClientError::network(
            "Failed to connect",
            "socket closed before opening",
        )),
        Ok(false) => {
            let _ = ws.close(None, None);
            Err(ClientError::network(
                "Failed to connect",
                format!("no answer within {}ms", timeout_ms),
            ))
        }
        Err(e) => Err(ClientError::network("Failed to connect", e)),
    }
}

/// WebSocket sender
pub struct WsSender {
    sink: SplitSink<WebSocket, WsMessage>,
}

impl WsSender {
    pub async fn send(&mut self, frame: &ClientFrame) -> Result<(), ClientError> {
        let json = frame.to_json()?;

        log::debug!("Sending message: {}", json);

        self.sink
            .send(WsMessage::Text(json))
            .await
            .map_err(|e| ClientError::network("Failed to send", e))
    }

    /// Close the underlying socket
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.sink
            .close()
            .await
            .map_err(|e| ClientError::network("Failed to close socket", e))
    }
}

/// WebSocket receiver
pub struct WsReceiver {
    stream: SplitStream<WebSocket>,
}

impl WsReceiver {
    /// Next text payload; `Ok(None)` once the socket has closed
    pub async fn receive(&mut self) -> Result<Option<String>, ClientError> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    log::debug!("Received message: {}", text);
                    return Ok(Some(text));
                }
                Some(Ok(WsMessage::Bytes(_))) => {
                    log::warn!("Received unexpected binary message");
                }
                Some(Err(e)) => {
                    return Err(ClientError::network("WebSocket error", e));
                }
                None => {
                    log::info!("WebSocket connection closed");
                    return Ok(None);
                }
            }
        }
    }
}
