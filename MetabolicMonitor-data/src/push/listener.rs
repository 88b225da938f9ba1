use std::time::Duration;

use reqwest::Client;
use tokio::sync::{mpsc::UnboundedSender, watch};
use tracing::{debug, info, warn};

use super::packet::{
    connect_message, decode_payload, decode_socket_packet, encode_packet, encode_payload,
    EnginePacket, Handshake, SocketPacket, DEFAULT_NAMESPACE,
};
use super::{PushError, PushEvent};
use crate::config::ClientConfig;

/// Extra time allowed on a long-poll beyond the server's ping schedule
const POLL_GRACE: Duration = Duration::from_secs(5);

/// Why a session ended without an error
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Shutdown was requested or the event receiver went away
    Shutdown,
    /// The server closed the session; reconnect
    ServerClosed,
}

/// Socket.IO client over the Engine.IO long-polling transport
///
/// Opens a session against `<base>/socket.io/`, joins the default namespace,
/// answers pings, and forwards every event to the channel passed to
/// [`SocketIoListener::run`]. A dropped session is reopened after the
/// configured reconnect delay.
#[derive(Debug, Clone)]
pub struct SocketIoListener {
    client: Client,
    endpoint: String,
    reconnect_delay: Duration,
}

impl SocketIoListener {
    /// Create a listener for the configured backend
    pub fn new(config: &ClientConfig) -> Result<Self, PushError> {
        let config = config.clone().validated()?;
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: config.endpoint("/socket.io/"),
            reconnect_delay: config.reconnect_delay(),
        })
    }

    /// Polling endpoint, e.g. `http://localhost:5000/socket.io/`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Receive events until `shutdown` flips to `true` or `events` is closed
    pub async fn run(self, events: UnboundedSender<PushEvent>, mut shutdown: watch::Receiver<bool>) {
        info!(endpoint = %self.endpoint, "Opening push connection");

        loop {
            if *shutdown.borrow() || events.is_closed() {
                break;
            }

            match self.session(&events, &mut shutdown).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::ServerClosed) => {
                    info!("Push session closed by server, reconnecting");
                }
                Err(e) => {
                    warn!(error = %e, "Push connection failed");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Push connection closed");
    }

    async fn session(
        &self,
        events: &UnboundedSender<PushEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, PushError> {
        let handshake = self.handshake().await?;
        let sid = handshake.sid.clone();
        let poll_timeout = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout)
            + POLL_GRACE;
        debug!(sid = %sid, "Engine.IO session opened");

        self.post(&sid, &[connect_message(DEFAULT_NAMESPACE)]).await?;

        loop {
            let body = tokio::select! {
                body = self.poll(&sid, poll_timeout) => body?,
                changed = shutdown.changed() => {
                    if changed.is_ok() && !*shutdown.borrow() {
                        continue;
                    }
                    if let Err(e) = self.post(&sid, &[EnginePacket::Close]).await {
                        debug!(error = %e, "Close packet not delivered");
                    }
                    return Ok(SessionEnd::Shutdown);
                }
            };

            for packet in decode_payload(&body)? {
                match packet {
                    EnginePacket::Ping(data) => {
                        self.post(&sid, &[EnginePacket::Pong(data)]).await?;
                    }
                    EnginePacket::Close => return Ok(SessionEnd::ServerClosed),
                    EnginePacket::Message(data) => match decode_socket_packet(&data)? {
                        SocketPacket::Connect { namespace, .. } => {
                            info!(namespace = %namespace, "Push channel connected");
                        }
                        SocketPacket::Event { name, args, .. } => {
                            debug!(event = %name, "Push event received");
                            if events.send(PushEvent { name, args }).is_err() {
                                return Ok(SessionEnd::Shutdown);
                            }
                        }
                        SocketPacket::Disconnect { namespace } => {
                            info!(namespace = %namespace, "Server disconnected namespace");
                            return Ok(SessionEnd::ServerClosed);
                        }
                        SocketPacket::ConnectError { message, .. } => {
                            return Err(PushError::Rejected(message));
                        }
                        SocketPacket::Unsupported(kind) => {
                            debug!(kind = %kind, "Ignoring unsupported socket packet");
                        }
                    },
                    EnginePacket::Open(_) => {
                        return Err(PushError::Protocol("unexpected open packet".to_string()))
                    }
                    EnginePacket::Pong(_)
                    | EnginePacket::Upgrade
                    | EnginePacket::Noop
                    | EnginePacket::Binary(_) => {}
                }
            }
        }
    }

    async fn handshake(&self) -> Result<Handshake, PushError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("EIO", "4"), ("transport", "polling")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PushError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;

        match decode_payload(&body)?.into_iter().next() {
            Some(EnginePacket::Open(handshake)) => Ok(handshake),
            other => Err(PushError::Protocol(format!(
                "expected open packet, got {:?}",
                other
            ))),
        }
    }

    async fn poll(&self, sid: &str, timeout: Duration) -> Result<String, PushError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("EIO", "4"), ("transport", "polling"), ("sid", sid)])
            .timeout(timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PushError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn post(&self, sid: &str, packets: &[EnginePacket]) -> Result<(), PushError> {
        let body = if packets.len() == 1 {
            encode_packet(&packets[0])
        } else {
            encode_payload(packets)
        };
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("EIO", "4"), ("transport", "polling"), ("sid", sid)])
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(PushError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}
