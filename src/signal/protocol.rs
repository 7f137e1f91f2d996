//! Pluggable signal protocol trait.
//!
//! A protocol is an optional processing stage interposed between raw signal
//! traffic and its final delivery: inbound protocols run before listener
//! dispatch, outbound protocols run before the transport send. A protocol may
//! transform, hold back, drop, or multiply envelopes, and may keep internal
//! state across calls (e.g. to enforce ordering or acknowledgments). The
//! worker guarantees serialized invocation, so implementations never need
//! internal locking.

use super::envelope::SignalEnvelope;

/// Error raised by a protocol's `process` call.
///
/// A failed call is logged at the worker loop boundary and the pipeline moves
/// on to the next queued envelope; one bad envelope never stops the pipeline.
#[derive(Debug, thiserror::Error)]
#[error("signal protocol error: {0}")]
pub struct ProtocolError(pub String);

impl ProtocolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A transform applied to every signal flowing in one direction.
///
/// `process` consumes one envelope and produces zero, one, or more output
/// envelopes. It takes `&mut self` because implementations are commonly
/// stateful; each protocol instance is owned by exactly one worker and is
/// never invoked concurrently with itself.
pub trait SignalProtocol: Send + 'static {
    fn process(&mut self, envelope: SignalEnvelope) -> Result<Vec<SignalEnvelope>, ProtocolError>;
}

/// Identity protocol: every envelope passes through unchanged.
pub struct Passthrough;

impl SignalProtocol for Passthrough {
    fn process(&mut self, envelope: SignalEnvelope) -> Result<Vec<SignalEnvelope>, ProtocolError> {
        Ok(vec![envelope])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_is_identity() {
        let envelope = SignalEnvelope::new("chat", Some("hello".to_string()));
        let out = Passthrough.process(envelope.clone()).unwrap();
        assert_eq!(out, vec![envelope]);
    }
}
