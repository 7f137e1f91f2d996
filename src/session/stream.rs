//! Stream-based signal subscription.
//!
//! Alternative to callback listeners: `SessionFacade::signal_stream` returns
//! a `Stream` of delivered signals for one name (or the wildcard). Dropping
//! the stream unregisters the backing listener.

use super::listeners::{ListenerRegistry, SignalListener};
use crate::signal::SignalEnvelope;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// One signal as delivered to a subscriber.
#[derive(Debug, Clone)]
pub struct ReceivedSignal {
    pub envelope: SignalEnvelope,
    pub from_self: bool,
}

/// Listener that forwards deliveries into a channel.
pub(crate) struct ChannelListener {
    sender: mpsc::UnboundedSender<ReceivedSignal>,
}

impl SignalListener for ChannelListener {
    fn on_signal(&self, envelope: &SignalEnvelope, from_self: bool) {
        // Receiver gone means the stream was dropped; Drop unregisters us.
        let _ = self.sender.send(ReceivedSignal {
            envelope: envelope.clone(),
            from_self,
        });
    }
}

/// Stream of signals delivered under one registration key.
pub struct SignalStream {
    inner: UnboundedReceiverStream<ReceivedSignal>,
    registry: Arc<ListenerRegistry<dyn SignalListener>>,
    listener: Arc<dyn SignalListener>,
    key: String,
}

impl SignalStream {
    pub(crate) fn register(
        registry: Arc<ListenerRegistry<dyn SignalListener>>,
        key: &str,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let listener: Arc<dyn SignalListener> = Arc::new(ChannelListener { sender });
        registry.register(key, Arc::clone(&listener));
        Self {
            inner: UnboundedReceiverStream::new(receiver),
            registry,
            listener,
            key: key.to_string(),
        }
    }

    /// The signal name (or wildcard) this stream is registered under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Stream for SignalStream {
    type Item = ReceivedSignal;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for SignalStream {
    fn drop(&mut self) {
        self.registry.unregister(&self.key, &self.listener);
    }
}
