//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which carries Socket.IO events over a
//! WebSocket. This is a thin layer that only moves payloads between the socket
//! and two channels. Protocol logic remains in the Sans-IO [`Client`].
//!
//! The task answers Engine.IO pings, joins the default namespace after the
//! open handshake, and holds outbound events until the server confirms the
//! namespace. When the connection ends for any reason it delivers exactly one
//! [`Inbound::Disconnect`] and stops. There is no reconnection.
//!
//! [`Client`]: crate::Client

use std::time::Duration;

use futures::{SinkExt, StreamExt, stream::SplitSink};
use parley_proto::{Inbound, Outbound, Packet, SocketPacket};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// Path and query of the Engine.IO WebSocket endpoint.
const ENGINE_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server URL is unusable.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Connection attempt timed out.
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),
}

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on the WebSocket handshake.
    pub connect_timeout: Duration,
    /// Capacity of each direction's channel.
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { connect_timeout: Duration::from_secs(10), channel_capacity: 64 }
    }
}

/// Handle to a connected client.
///
/// Payloads are sent/received via the channels, and an internal task handles
/// the WebSocket I/O.
pub struct ConnectedClient {
    /// Send payloads to the server.
    pub to_server: mpsc::Sender<Outbound>,
    /// Receive payloads from the server. Ends after a single
    /// [`Inbound::Disconnect`].
    pub from_server: mpsc::Receiver<Inbound>,
    /// Connection task.
    task: tokio::task::JoinHandle<()>,
}

impl ConnectedClient {
    /// Stop the connection immediately. Queued payloads are lost.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Close the connection after sending queued payloads.
    ///
    /// Waits at most `grace` for the task to finish, then aborts it.
    pub async fn close(self, grace: Duration) {
        let Self { to_server, from_server, task } = self;
        drop(to_server);

        let abort = task.abort_handle();
        if tokio::time::timeout(grace, task).await.is_err() {
            tracing::warn!(?grace, "connection did not close in time, aborting");
            abort.abort();
        }
        drop(from_server);
    }
}

/// Connect to a Parley server with the default configuration.
///
/// `server` is the HTTP(S) base URL the server listens on, e.g.
/// `http://localhost:3000`.
pub async fn connect(server: &str) -> Result<ConnectedClient, TransportError> {
    connect_with_config(server, TransportConfig::default()).await
}

/// Connect to a Parley server.
pub async fn connect_with_config(
    server: &str,
    config: TransportConfig,
) -> Result<ConnectedClient, TransportError> {
    let url = endpoint_url(server)?;
    tracing::debug!(%url, "connecting");

    let (ws, _response) = tokio::time::timeout(config.connect_timeout, connect_async(url.as_str()))
        .await
        .map_err(|_| TransportError::Timeout(config.connect_timeout))?
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    tracing::info!(%url, "connected");

    let capacity = config.channel_capacity.max(1);
    let (to_server_tx, to_server_rx) = mpsc::channel::<Outbound>(capacity);
    let (from_server_tx, from_server_rx) = mpsc::channel::<Inbound>(capacity);

    let task = tokio::spawn(run_connection(ws, to_server_rx, from_server_tx));

    Ok(ConnectedClient { to_server: to_server_tx, from_server: from_server_rx, task })
}

/// WebSocket URL of the Engine.IO endpoint for a server base URL.
///
/// `http` maps to `ws` and `https` to `wss`; a missing scheme means `ws`.
pub fn endpoint_url(server: &str) -> Result<String, TransportError> {
    let server = server.trim().trim_end_matches('/');

    let (scheme, rest) = match server.split_once("://") {
        Some(("http" | "ws", rest)) => ("ws", rest),
        Some(("https" | "wss", rest)) => ("wss", rest),
        Some((other, _)) => {
            return Err(TransportError::InvalidUrl(format!("unsupported scheme {other:?}")));
        },
        None => ("ws", server),
    };

    if rest.is_empty() {
        return Err(TransportError::InvalidUrl("missing host".into()));
    }

    Ok(format!("{scheme}://{rest}{ENGINE_PATH}"))
}

/// What the read side decided after a text frame.
enum Flow {
    Continue,
    Closed(String),
}

/// Socket.IO session on one WebSocket.
struct Connection {
    sink: WsSink,
    from_server: mpsc::Sender<Inbound>,
    /// Server confirmed the default namespace.
    joined: bool,
    /// Outbound events held until the namespace is joined.
    pending: Vec<Outbound>,
}

/// Run the connection, bridging between channels and the WebSocket.
async fn run_connection(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut to_server: mpsc::Receiver<Outbound>,
    from_server: mpsc::Sender<Inbound>,
) {
    let (sink, mut stream) = ws.split();
    let mut conn = Connection { sink, from_server, joined: false, pending: Vec::new() };

    let reason = loop {
        tokio::select! {
            outbound = to_server.recv() => match outbound {
                Some(outbound) => {
                    if let Err(reason) = conn.emit(outbound).await {
                        break reason;
                    }
                },
                None => {
                    let _ = conn.sink.send(Message::Close(None)).await;
                    break "client closed".to_owned();
                },
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Flow::Closed(reason) = conn.handle_text(text.as_str()).await {
                        break reason;
                    }
                },
                Some(Ok(Message::Close(_))) | None => break "transport close".to_owned(),
                Some(Ok(_)) => {},
                Some(Err(e)) => break format!("transport error: {e}"),
            },
        }
    };

    tracing::info!(%reason, "connection closed");
    let _ = conn.from_server.send(Inbound::Disconnect { reason }).await;
}

impl Connection {
    /// Send an event, or hold it until the namespace is joined.
    async fn emit(&mut self, outbound: Outbound) -> Result<(), String> {
        if !self.joined {
            self.pending.push(outbound);
            return Ok(());
        }

        let name = outbound.event_name();
        let packet = match outbound.into_packet() {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!(event = name, error = %e, "dropping unencodable event");
                return Ok(());
            },
        };

        tracing::debug!(event = name, "emit");
        self.send_packet(&packet).await
    }

    async fn send_packet(&mut self, packet: &Packet) -> Result<(), String> {
        let text = packet.encode().map_err(|e| format!("encode failed: {e}"))?;
        self.sink.send(Message::Text(text.into())).await.map_err(|e| format!("send failed: {e}"))
    }

    async fn handle_text(&mut self, text: &str) -> Flow {
        let packet = match Packet::decode(text) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed packet");
                return Flow::Continue;
            },
        };

        let result = match packet {
            Packet::Open(handshake) => {
                tracing::debug!(sid = %handshake.sid, "engine open");
                self.send_packet(&Packet::Message(SocketPacket::Connect(None))).await
            },
            Packet::Ping(data) => self.send_packet(&Packet::Pong(data)).await,
            Packet::Close => return Flow::Closed("server close".into()),
            Packet::Message(SocketPacket::Connect(_)) => self.join().await,
            Packet::Message(SocketPacket::Disconnect) => {
                return Flow::Closed("server namespace disconnect".into());
            },
            Packet::Message(SocketPacket::ConnectError(data)) => {
                tracing::warn!(%data, "namespace connect refused");
                return Flow::Closed(format!("connect error: {data}"));
            },
            Packet::Message(SocketPacket::Event { name, data }) => {
                return self.deliver(&name, data).await;
            },
            Packet::Pong(_) | Packet::Upgrade | Packet::Noop => Ok(()),
        };

        match result {
            Ok(()) => Flow::Continue,
            Err(reason) => Flow::Closed(reason),
        }
    }

    /// Namespace confirmed. Flush held events in order.
    async fn join(&mut self) -> Result<(), String> {
        tracing::debug!(held = self.pending.len(), "namespace joined");
        self.joined = true;
        for outbound in std::mem::take(&mut self.pending) {
            self.emit(outbound).await?;
        }
        Ok(())
    }

    async fn deliver(&mut self, name: &str, data: serde_json::Value) -> Flow {
        match Inbound::from_event(name, data) {
            Ok(Some(inbound)) => {
                tracing::debug!(event = name, "received");
                if self.from_server.send(inbound).await.is_err() {
                    return Flow::Closed("receiver dropped".into());
                }
            },
            Ok(None) => tracing::debug!(event = name, "ignoring unknown event"),
            Err(e) => tracing::warn!(event = name, error = %e, "dropping malformed event"),
        }
        Flow::Continue
    }
}
