//! Mock transport for testing.
//!
//! Records every raw send for assertions and supports failure injection on
//! the send paths, without a real SDK session.

use super::traits::{ConnectionId, SessionError, SessionResult, SessionTransport};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// One recorded raw send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSend {
    pub name: String,
    pub payload: Option<String>,
    pub target: Option<ConnectionId>,
}

#[derive(Default)]
struct MockState {
    sent: Vec<RawSend>,
    fail_sends: bool,
}

/// Mock session transport.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    local: ConnectionId,
}

impl MockTransport {
    /// Create a mock with a random local connection id.
    pub fn new() -> Self {
        Self::with_local_connection(ConnectionId(uuid::Uuid::new_v4().to_string()))
    }

    pub fn with_local_connection(local: ConnectionId) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            local,
        }
    }

    /// All raw sends in the order the transport received them.
    pub fn sent(&self) -> Vec<RawSend> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Raw sends with no target connection.
    pub fn broadcasts(&self) -> Vec<RawSend> {
        self.sent()
            .into_iter()
            .filter(|send| send.target.is_none())
            .collect()
    }

    /// Raw sends addressed to a specific connection.
    pub fn targeted(&self, connection: &ConnectionId) -> Vec<RawSend> {
        self.sent()
            .into_iter()
            .filter(|send| send.target.as_ref() == Some(connection))
            .collect()
    }

    /// Make subsequent sends fail with a transport error.
    pub fn fail_sends(&self, fail: bool) {
        self.state.lock().unwrap().fail_sends = fail;
    }

    /// Clear recorded state.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        *state = MockState::default();
    }

    fn record(&self, send: RawSend) -> SessionResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sends {
            return Err(SessionError::Transport("injected send failure".to_string()));
        }
        state.sent.push(send);
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionTransport for MockTransport {
    async fn send_signal(&self, name: &str, payload: Option<&str>) -> SessionResult<()> {
        self.record(RawSend {
            name: name.to_string(),
            payload: payload.map(str::to_string),
            target: None,
        })
    }

    async fn send_signal_to(
        &self,
        name: &str,
        payload: Option<&str>,
        connection: &ConnectionId,
    ) -> SessionResult<()> {
        self.record(RawSend {
            name: name.to_string(),
            payload: payload.map(str::to_string),
            target: Some(connection.clone()),
        })
    }

    fn local_connection(&self) -> Option<ConnectionId> {
        Some(self.local.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_broadcast_and_targeted_sends() {
        let transport = MockTransport::new();
        let peer = ConnectionId::from("peer-1");

        transport.send_signal("chat", Some("hello")).await.unwrap();
        transport
            .send_signal_to("chat", Some("direct"), &peer)
            .await
            .unwrap();

        assert_eq!(transport.sent().len(), 2);
        assert_eq!(transport.broadcasts().len(), 1);
        assert_eq!(transport.targeted(&peer).len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let transport = MockTransport::new();
        transport.fail_sends(true);

        let result = transport.send_signal("chat", None).await;
        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert!(transport.sent().is_empty());
    }
}
