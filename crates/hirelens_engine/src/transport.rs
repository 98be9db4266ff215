use std::collections::VecDeque;

use futures_util::{SinkExt, StreamExt};
use hirelens_logging::{lens_debug, lens_info, lens_trace, lens_warn};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::stomp::{decode_frames, StompFrame};
use crate::{TransportError, TransportMessage};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Raw WebSocket endpoint; SockJS endpoints expose it under `/websocket`.
    pub ws_url: String,
    pub destination_prefix: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8080/ws/websocket".to_string(),
            destination_prefix: "/dataUpdate".to_string(),
        }
    }
}

impl TransportSettings {
    pub fn destination_for(&self, job_id: &str) -> String {
        format!("{}/{}", self.destination_prefix.trim_end_matches('/'), job_id)
    }
}

/// Subscribe/publish channel the session manager runs on.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Resolves once the broker handshake completed.
    async fn connect(&mut self) -> Result<(), TransportError>;

    async fn subscribe(&mut self, destination: &str) -> Result<(), TransportError>;

    /// Next message on any subscription; `None` once the channel ended.
    async fn next_message(&mut self) -> Option<Result<TransportMessage, TransportError>>;

    /// Safe to call when already disconnected.
    async fn disconnect(&mut self) -> Result<(), TransportError>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct StompTransport {
    settings: TransportSettings,
    socket: Option<WsStream>,
    pending: VecDeque<StompFrame>,
    next_subscription: u32,
}

impl StompTransport {
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            settings,
            socket: None,
            pending: VecDeque::new(),
            next_subscription: 0,
        }
    }

    async fn send_frame(&mut self, frame: StompFrame) -> Result<(), TransportError> {
        let socket = self.socket.as_mut().ok_or(TransportError::NotConnected)?;
        lens_trace!("-> {}", frame.command);
        socket
            .send(Message::Text(frame.encode()))
            .await
            .map_err(|err| TransportError::Closed(err.to_string()))
    }

    /// Next STOMP frame off the socket; `None` when the socket ended.
    async fn read_frame(&mut self) -> Option<Result<StompFrame, TransportError>> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Some(Ok(frame));
            }
            let socket = self.socket.as_mut()?;
            let text = match socket.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                Some(Ok(Message::Close(_))) | None => {
                    lens_debug!("websocket closed by peer");
                    self.socket = None;
                    return None;
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    self.socket = None;
                    return Some(Err(TransportError::Closed(err.to_string())));
                }
            };
            match decode_frames(&text) {
                Ok(frames) => self.pending.extend(frames),
                Err(err) => return Some(Err(err.into())),
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for StompTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let (socket, _response) = connect_async(self.settings.ws_url.as_str())
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        self.socket = Some(socket);
        self.pending.clear();

        let host = host_of(&self.settings.ws_url).to_string();
        self.send_frame(StompFrame::connect(&host)).await?;

        loop {
            match self.read_frame().await {
                Some(Ok(frame)) if frame.command == "CONNECTED" => {
                    lens_info!(
                        "connected to {} (stomp {})",
                        self.settings.ws_url,
                        frame.get_header("version").unwrap_or("1.0")
                    );
                    return Ok(());
                }
                Some(Ok(frame)) if frame.command == "ERROR" => {
                    self.socket = None;
                    return Err(TransportError::Handshake(broker_message(&frame)));
                }
                Some(Ok(frame)) => {
                    lens_debug!("ignoring {} before CONNECTED", frame.command);
                }
                Some(Err(err)) => {
                    self.socket = None;
                    return Err(TransportError::Handshake(err.to_string()));
                }
                None => {
                    return Err(TransportError::Handshake(
                        "socket closed during handshake".to_string(),
                    ))
                }
            }
        }
    }

    async fn subscribe(&mut self, destination: &str) -> Result<(), TransportError> {
        let id = format!("sub-{}", self.next_subscription);
        self.next_subscription += 1;
        self.send_frame(StompFrame::subscribe(&id, destination))
            .await?;
        lens_debug!("subscribed {} to {}", id, destination);
        Ok(())
    }

    async fn next_message(&mut self) -> Option<Result<TransportMessage, TransportError>> {
        loop {
            let frame = match self.read_frame().await? {
                Ok(frame) => frame,
                Err(err) => return Some(Err(err)),
            };
            match frame.command.as_str() {
                "MESSAGE" => {
                    let destination = frame.get_header("destination").unwrap_or_default();
                    return Some(Ok(TransportMessage {
                        destination: destination.to_string(),
                        body: frame.body,
                    }));
                }
                "ERROR" => return Some(Err(TransportError::Broker(broker_message(&frame)))),
                other => lens_trace!("skipping {} frame", other),
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        if self.socket.is_none() {
            return Ok(());
        }
        if let Err(err) = self.send_frame(StompFrame::disconnect()).await {
            lens_warn!("DISCONNECT not delivered: {}", err);
        }
        if let Some(mut socket) = self.socket.take() {
            if let Err(err) = socket.close(None).await {
                lens_debug!("websocket close: {}", err);
            }
        }
        self.pending.clear();
        Ok(())
    }
}

fn broker_message(frame: &StompFrame) -> String {
    match frame.get_header("message") {
        Some(message) => message.to_string(),
        None => frame.body.trim().to_string(),
    }
}

/// Host part of a `ws://host:port/path` url, used for the STOMP `host` header.
fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split('/').next().unwrap_or(rest);
    let authority = authority.rsplit('@').next().unwrap_or(authority);
    match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => authority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_header_drops_scheme_port_and_path() {
        assert_eq!(host_of("ws://localhost:8080/ws/websocket"), "localhost");
        assert_eq!(host_of("wss://api.example.com/ws"), "api.example.com");
        assert_eq!(host_of("ws://user@10.0.0.2:9000"), "10.0.0.2");
    }

    #[test]
    fn destination_joins_prefix_and_job() {
        let settings = TransportSettings::default();
        assert_eq!(settings.destination_for("abc"), "/dataUpdate/abc");

        let settings = TransportSettings {
            destination_prefix: "/topic/".to_string(),
            ..TransportSettings::default()
        };
        assert_eq!(settings.destination_for("abc"), "/topic/abc");
    }
}
