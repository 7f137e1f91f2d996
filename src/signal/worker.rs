//! Serialized signal processing worker.
//!
//! One worker per pipeline direction. The worker owns an unbounded queue and
//! a hot-swappable protocol slot; a dedicated tokio task dequeues envelopes
//! in FIFO order, runs them through the active protocol, and awaits the
//! completion sink for each output so downstream effects keep the queue
//! order. Producers never block.

use super::envelope::SignalEnvelope;
use super::protocol::SignalProtocol;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Completion callback invoked once per protocol output envelope.
pub type SignalSink = Box<dyn FnMut(SignalEnvelope) -> BoxFuture<'static, ()> + Send>;

/// Background worker that serializes envelopes through one protocol instance.
///
/// The protocol slot is read once per dequeue, so a hot-swap takes effect for
/// every envelope dequeued after the swap; an envelope is processed by
/// exactly one protocol or, when the slot is empty, by none at all. The
/// facade keeps traffic away from a worker with an empty slot; envelopes that
/// race a swap to `None` are dropped here with a trace log.
pub struct SignalWorker {
    queue: mpsc::UnboundedSender<SignalEnvelope>,
    protocol: Arc<Mutex<Option<Box<dyn SignalProtocol>>>>,
    handle: JoinHandle<()>,
}

impl SignalWorker {
    /// Spawn the worker task with an initial protocol and completion sink.
    pub fn spawn(protocol: Option<Box<dyn SignalProtocol>>, mut sink: SignalSink) -> Self {
        let (queue, mut rx) = mpsc::unbounded_channel::<SignalEnvelope>();
        let protocol = Arc::new(Mutex::new(protocol));
        let slot = Arc::clone(&protocol);

        let handle = tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let signal = envelope.name().to_string();
                // Short critical section: the slot is only held for the
                // duration of the transform, never across an await.
                let result = {
                    let mut slot = slot.lock().unwrap();
                    slot.as_mut().map(|protocol| protocol.process(envelope))
                };
                match result {
                    None => {
                        trace!(%signal, "protocol slot empty, dropping envelope");
                    }
                    Some(Err(e)) => {
                        warn!(%signal, error = %e, "signal protocol failed, skipping envelope");
                    }
                    Some(Ok(outputs)) => {
                        for output in outputs {
                            sink(output).await;
                        }
                    }
                }
            }
            debug!("signal worker queue closed, loop exiting");
        });

        Self {
            queue,
            protocol,
            handle,
        }
    }

    /// Enqueue an envelope for processing. Never blocks; FIFO per worker.
    pub fn submit(&self, envelope: SignalEnvelope) {
        if self.queue.send(envelope).is_err() {
            warn!("signal worker is stopped, envelope discarded");
        }
    }

    /// Atomically replace the active protocol for all future dequeues.
    ///
    /// Envelopes already queued are processed by whichever protocol is active
    /// when they are dequeued. `None` empties the slot; queued envelopes
    /// dequeued after that produce no output.
    pub fn switch_protocol(&self, protocol: Option<Box<dyn SignalProtocol>>) {
        let mut slot = self.protocol.lock().unwrap();
        debug!(
            was_active = slot.is_some(),
            now_active = protocol.is_some(),
            "switching signal protocol"
        );
        *slot = protocol;
    }

    /// Close the queue and let the loop drain in-flight envelopes.
    ///
    /// Returns the task handle so callers that care can await completion.
    pub fn stop(self) -> JoinHandle<()> {
        drop(self.queue);
        self.handle
    }
}
