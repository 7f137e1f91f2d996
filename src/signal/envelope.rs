//! Signal envelope type.
//!
//! One envelope per signal transit: name, optional string payload, and the
//! source/destination connection endpoints. Envelopes are immutable after
//! construction; the builder methods return a new value.

use crate::session::traits::ConnectionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One signal transit event.
///
/// - `source == None` means the signal originated from the local participant
///   (or the transport reported no sender).
/// - `destination == None` means broadcast to all participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEnvelope {
    name: String,
    payload: Option<String>,
    source: Option<ConnectionId>,
    destination: Option<ConnectionId>,
}

impl SignalEnvelope {
    /// Create an envelope with no endpoints (local origin, broadcast).
    pub fn new(name: impl Into<String>, payload: Option<String>) -> Self {
        Self {
            name: name.into(),
            payload,
            source: None,
            destination: None,
        }
    }

    /// Return a copy of this envelope with the given source connection.
    pub fn with_source(mut self, source: Option<ConnectionId>) -> Self {
        self.source = source;
        self
    }

    /// Return a copy of this envelope with the given destination connection.
    pub fn with_destination(mut self, destination: Option<ConnectionId>) -> Self {
        self.destination = destination;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn source(&self) -> Option<&ConnectionId> {
        self.source.as_ref()
    }

    pub fn destination(&self) -> Option<&ConnectionId> {
        self.destination.as_ref()
    }
}

impl fmt::Display for SignalEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(dst) = &self.destination {
            write!(f, " -> {}", dst)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_fields() {
        let src = ConnectionId::from("conn-a");
        let dst = ConnectionId::from("conn-b");
        let envelope = SignalEnvelope::new("chat", Some("hi".to_string()))
            .with_source(Some(src.clone()))
            .with_destination(Some(dst.clone()));

        assert_eq!(envelope.name(), "chat");
        assert_eq!(envelope.payload(), Some("hi"));
        assert_eq!(envelope.source(), Some(&src));
        assert_eq!(envelope.destination(), Some(&dst));
    }

    #[test]
    fn test_defaults_to_broadcast() {
        let envelope = SignalEnvelope::new("ping", None);
        assert!(envelope.source().is_none());
        assert!(envelope.destination().is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let envelope = SignalEnvelope::new("status", Some("{\"ready\":true}".to_string()))
            .with_destination(Some(ConnectionId::from("conn-c")));
        let json = serde_json::to_string(&envelope).unwrap();
        let back: SignalEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }
}
