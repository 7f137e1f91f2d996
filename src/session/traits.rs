//! Transport trait abstraction and session event types.
//!
//! The underlying video session SDK is treated as a black box: it raises
//! events and accepts outbound signal sends. These traits let the facade be
//! driven by the real SDK glue in production and by `MockTransport` in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant's logical attachment to the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub String);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A media stream identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub String);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection metadata carried by connection lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub data: Option<String>,
}

/// Source of a stream's video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoType {
    Camera,
    Screen,
}

/// Stream metadata carried by stream lifecycle and property events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub id: StreamId,
    pub name: Option<String>,
    pub connection: Connection,
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session facade errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("session error {code}: {message}")]
    Session { code: i32, message: String },
}

/// The fixed (non-signal) session events raised by the transport.
///
/// These fan out synchronously to registered observers, in registration
/// order, on the calling task; no pipeline is involved.
#[derive(Debug)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    Error(SessionError),
    StreamReceived(Stream),
    StreamDropped(Stream),
    ConnectionCreated(Connection),
    ConnectionDestroyed(Connection),
    StreamHasAudioChanged { stream: Stream, enabled: bool },
    StreamHasVideoChanged { stream: Stream, enabled: bool },
    StreamVideoDimensionsChanged { stream: Stream, width: u32, height: u32 },
    StreamVideoTypeChanged { stream: Stream, video_type: VideoType },
    ArchiveStarted { id: String, name: Option<String> },
    ArchiveStopped { id: String },
    Reconnecting,
    Reconnected,
}

/// Outbound surface of the underlying session SDK.
///
/// The facade installs exactly one inbound handler on the real SDK and calls
/// these primitives for outbound traffic. Wire format, media routing, and
/// reconnection are the transport's concern.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Broadcast a signal to every participant.
    async fn send_signal(&self, name: &str, payload: Option<&str>) -> SessionResult<()>;

    /// Send a signal to one participant.
    async fn send_signal_to(
        &self,
        name: &str,
        payload: Option<&str>,
        connection: &ConnectionId,
    ) -> SessionResult<()>;

    /// The local participant's connection id, once connected.
    fn local_connection(&self) -> Option<ConnectionId>;
}
