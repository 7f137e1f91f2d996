//! Session facade: multi-listener fan-out plus optional signal pipelines.
//!
//! Wires the transport's single-callback events into the listener registries
//! and routes signal traffic through one serialized worker per direction when
//! a protocol is configured. All entry points return immediately; transform
//! and listener work happens on background tasks, so the facade must be used
//! from within a tokio runtime.

use super::listeners::{
    ArchiveObserver, ConnectionObserver, ListenerRegistry, ObserverList, ReconnectionObserver,
    SessionObserver, SignalListener, StreamPropertyObserver, ANY_SIGNAL,
};
use super::stream::SignalStream;
use super::traits::{ConnectionId, SessionEvent, SessionTransport};
use crate::signal::{SignalEnvelope, SignalProtocol, SignalSink, SignalWorker};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Facade configuration.
#[derive(Debug, Clone, Default)]
pub struct FacadeConfig {
    /// Session identifier, included in log fields.
    pub session_id: String,
}

/// Per-direction pipeline state.
///
/// `Direct` while no protocol is configured (traffic bypasses the worker),
/// `Pipelined` while one is. The worker is created lazily on the first
/// non-null protocol and reused across hot-swaps, so its queue survives
/// protocol switches.
#[derive(Default)]
struct Pipeline {
    worker: Option<SignalWorker>,
    pipelined: bool,
}

/// Facade over a session transport.
pub struct SessionFacade {
    transport: Arc<dyn SessionTransport>,
    config: FacadeConfig,
    signal_listeners: Arc<ListenerRegistry<dyn SignalListener>>,
    session_observers: ObserverList<dyn SessionObserver>,
    connection_observers: ObserverList<dyn ConnectionObserver>,
    stream_property_observers: ObserverList<dyn StreamPropertyObserver>,
    archive_observers: ObserverList<dyn ArchiveObserver>,
    reconnection_observers: ObserverList<dyn ReconnectionObserver>,
    inbound: Mutex<Pipeline>,
    outbound: Mutex<Pipeline>,
}

impl SessionFacade {
    pub fn new(transport: Arc<dyn SessionTransport>, config: FacadeConfig) -> Self {
        Self {
            transport,
            config,
            signal_listeners: Arc::new(ListenerRegistry::new()),
            session_observers: ObserverList::new(),
            connection_observers: ObserverList::new(),
            stream_property_observers: ObserverList::new(),
            archive_observers: ObserverList::new(),
            reconnection_observers: ObserverList::new(),
            inbound: Mutex::new(Pipeline::default()),
            outbound: Mutex::new(Pipeline::default()),
        }
    }

    // ----- signal listener surface -----

    /// Register a listener for one signal name, or [`ANY_SIGNAL`] for all.
    pub fn add_signal_listener(&self, signal_name: &str, listener: Arc<dyn SignalListener>) {
        debug!(
            session = %self.config.session_id,
            signal = %signal_name,
            "adding signal listener"
        );
        self.signal_listeners.register(signal_name, listener);
    }

    /// Remove a listener from every signal name it is registered under.
    pub fn remove_signal_listener(&self, listener: &Arc<dyn SignalListener>) {
        self.signal_listeners.unregister_all(listener);
    }

    /// Remove a listener from one signal name only.
    pub fn remove_signal_listener_for(&self, signal_name: &str, listener: &Arc<dyn SignalListener>) {
        self.signal_listeners.unregister(signal_name, listener);
    }

    /// Subscribe to one signal name (or [`ANY_SIGNAL`]) as a `Stream`.
    pub fn signal_stream(&self, signal_name: &str) -> SignalStream {
        SignalStream::register(Arc::clone(&self.signal_listeners), signal_name)
    }

    // ----- fixed-event observer surface -----

    pub fn add_session_observer(&self, observer: Arc<dyn SessionObserver>) {
        self.session_observers.add(observer);
    }

    pub fn remove_session_observer(&self, observer: &Arc<dyn SessionObserver>) {
        self.session_observers.remove(observer);
    }

    pub fn add_connection_observer(&self, observer: Arc<dyn ConnectionObserver>) {
        self.connection_observers.add(observer);
    }

    pub fn remove_connection_observer(&self, observer: &Arc<dyn ConnectionObserver>) {
        self.connection_observers.remove(observer);
    }

    pub fn add_stream_property_observer(&self, observer: Arc<dyn StreamPropertyObserver>) {
        self.stream_property_observers.add(observer);
    }

    pub fn remove_stream_property_observer(&self, observer: &Arc<dyn StreamPropertyObserver>) {
        self.stream_property_observers.remove(observer);
    }

    pub fn add_archive_observer(&self, observer: Arc<dyn ArchiveObserver>) {
        self.archive_observers.add(observer);
    }

    pub fn remove_archive_observer(&self, observer: &Arc<dyn ArchiveObserver>) {
        self.archive_observers.remove(observer);
    }

    pub fn add_reconnection_observer(&self, observer: Arc<dyn ReconnectionObserver>) {
        self.reconnection_observers.add(observer);
    }

    pub fn remove_reconnection_observer(&self, observer: &Arc<dyn ReconnectionObserver>) {
        self.reconnection_observers.remove(observer);
    }

    // ----- protocol configuration -----

    /// Configure the inbound signal protocol; `None` returns the direction to
    /// pass-through. Hot-swapping between two protocols keeps the worker and
    /// its queue; queued envelopes are processed by whichever protocol is
    /// active when they are dequeued.
    pub fn set_inbound_protocol(&self, protocol: Option<Box<dyn SignalProtocol>>) {
        let mut pipeline = self.inbound.lock().unwrap();
        debug!(
            session = %self.config.session_id,
            active = protocol.is_some(),
            "configuring inbound signal protocol"
        );
        pipeline.pipelined = protocol.is_some();
        match &pipeline.worker {
            Some(worker) => worker.switch_protocol(protocol),
            None => {
                if protocol.is_some() {
                    pipeline.worker = Some(SignalWorker::spawn(protocol, self.dispatch_sink()));
                }
            }
        }
    }

    /// Configure the outbound signal protocol; `None` returns the direction
    /// to pass-through.
    pub fn set_outbound_protocol(&self, protocol: Option<Box<dyn SignalProtocol>>) {
        let mut pipeline = self.outbound.lock().unwrap();
        debug!(
            session = %self.config.session_id,
            active = protocol.is_some(),
            "configuring outbound signal protocol"
        );
        pipeline.pipelined = protocol.is_some();
        match &pipeline.worker {
            Some(worker) => worker.switch_protocol(protocol),
            None => {
                if protocol.is_some() {
                    pipeline.worker = Some(SignalWorker::spawn(protocol, self.send_sink()));
                }
            }
        }
    }

    /// Disable both signal pipelines.
    pub fn clear_signal_protocols(&self) {
        self.set_inbound_protocol(None);
        self.set_outbound_protocol(None);
    }

    // ----- outbound path -----

    /// Send a signal, optionally targeted at one connection. Returns
    /// immediately; the send happens on a background task or the outbound
    /// worker. An explicit target overrides the envelope's destination and is
    /// preserved end-to-end through the pipeline.
    pub fn send_signal(&self, envelope: SignalEnvelope, target: Option<&ConnectionId>) {
        let envelope = match target {
            Some(connection) => envelope.with_destination(Some(connection.clone())),
            None => envelope,
        };
        let pipeline = self.outbound.lock().unwrap();
        match (&pipeline.worker, pipeline.pipelined) {
            (Some(worker), true) => worker.submit(envelope),
            _ => {
                drop(pipeline);
                let transport = Arc::clone(&self.transport);
                tokio::spawn(async move {
                    forward_to_transport(transport.as_ref(), &envelope).await;
                });
            }
        }
    }

    // ----- inbound path -----

    /// The single inbound signal handler the facade installs on the
    /// transport. Builds the envelope and routes it through the inbound
    /// pipeline when one is configured, otherwise dispatches directly.
    pub fn on_signal_received(
        &self,
        source: Option<ConnectionId>,
        signal_name: &str,
        payload: Option<String>,
    ) {
        let envelope = SignalEnvelope::new(signal_name, payload)
            .with_source(source)
            .with_destination(self.transport.local_connection());
        let pipeline = self.inbound.lock().unwrap();
        match (&pipeline.worker, pipeline.pipelined) {
            (Some(worker), true) => worker.submit(envelope),
            _ => {
                drop(pipeline);
                dispatch_signal(
                    &self.signal_listeners,
                    self.transport.local_connection().as_ref(),
                    &envelope,
                );
            }
        }
    }

    /// The single fixed-event handler the facade installs on the transport.
    /// Fan-out is synchronous, in registration order, on the calling task.
    pub fn on_session_event(&self, event: SessionEvent) {
        match &event {
            SessionEvent::Connected => {
                for observer in self.session_observers.snapshot() {
                    observer.on_connected();
                }
            }
            SessionEvent::Disconnected => {
                for observer in self.session_observers.snapshot() {
                    observer.on_disconnected();
                }
            }
            SessionEvent::Error(error) => {
                for observer in self.session_observers.snapshot() {
                    observer.on_error(error);
                }
            }
            SessionEvent::StreamReceived(stream) => {
                for observer in self.session_observers.snapshot() {
                    observer.on_stream_received(stream);
                }
            }
            SessionEvent::StreamDropped(stream) => {
                for observer in self.session_observers.snapshot() {
                    observer.on_stream_dropped(stream);
                }
            }
            SessionEvent::ConnectionCreated(connection) => {
                for observer in self.connection_observers.snapshot() {
                    observer.on_connection_created(connection);
                }
            }
            SessionEvent::ConnectionDestroyed(connection) => {
                for observer in self.connection_observers.snapshot() {
                    observer.on_connection_destroyed(connection);
                }
            }
            SessionEvent::StreamHasAudioChanged { stream, enabled } => {
                for observer in self.stream_property_observers.snapshot() {
                    observer.on_stream_has_audio_changed(stream, *enabled);
                }
            }
            SessionEvent::StreamHasVideoChanged { stream, enabled } => {
                for observer in self.stream_property_observers.snapshot() {
                    observer.on_stream_has_video_changed(stream, *enabled);
                }
            }
            SessionEvent::StreamVideoDimensionsChanged {
                stream,
                width,
                height,
            } => {
                for observer in self.stream_property_observers.snapshot() {
                    observer.on_stream_video_dimensions_changed(stream, *width, *height);
                }
            }
            SessionEvent::StreamVideoTypeChanged { stream, video_type } => {
                for observer in self.stream_property_observers.snapshot() {
                    observer.on_stream_video_type_changed(stream, *video_type);
                }
            }
            SessionEvent::ArchiveStarted { id, name } => {
                for observer in self.archive_observers.snapshot() {
                    observer.on_archive_started(id, name.as_deref());
                }
            }
            SessionEvent::ArchiveStopped { id } => {
                for observer in self.archive_observers.snapshot() {
                    observer.on_archive_stopped(id);
                }
            }
            SessionEvent::Reconnecting => {
                for observer in self.reconnection_observers.snapshot() {
                    observer.on_reconnecting();
                }
            }
            SessionEvent::Reconnected => {
                for observer in self.reconnection_observers.snapshot() {
                    observer.on_reconnected();
                }
            }
        }
    }

    // ----- worker sinks -----

    /// Completion sink for the inbound worker: listener dispatch.
    fn dispatch_sink(&self) -> SignalSink {
        let registry = Arc::clone(&self.signal_listeners);
        let transport = Arc::clone(&self.transport);
        Box::new(move |envelope| {
            let registry = Arc::clone(&registry);
            let transport = Arc::clone(&transport);
            Box::pin(async move {
                dispatch_signal(&registry, transport.local_connection().as_ref(), &envelope);
            })
        })
    }

    /// Completion sink for the outbound worker: raw transport send. Awaited
    /// per output, so raw sends keep the worker's FIFO order.
    fn send_sink(&self) -> SignalSink {
        let transport = Arc::clone(&self.transport);
        Box::new(move |envelope| {
            let transport = Arc::clone(&transport);
            Box::pin(async move {
                forward_to_transport(transport.as_ref(), &envelope).await;
            })
        })
    }
}

/// Hand one envelope to the transport: targeted send when a destination is
/// present, broadcast otherwise. Send failures are logged, never propagated.
async fn forward_to_transport(transport: &dyn SessionTransport, envelope: &SignalEnvelope) {
    let result = match envelope.destination() {
        Some(connection) => {
            transport
                .send_signal_to(envelope.name(), envelope.payload(), connection)
                .await
        }
        None => transport.send_signal(envelope.name(), envelope.payload()).await,
    };
    if let Err(e) = result {
        warn!(signal = %envelope.name(), error = %e, "transport send failed");
    }
}

/// Fan a signal out to wildcard listeners and exact-name listeners, each on
/// its own task. No listeners for a name is a normal state, logged only.
fn dispatch_signal(
    registry: &ListenerRegistry<dyn SignalListener>,
    local: Option<&ConnectionId>,
    envelope: &SignalEnvelope,
) {
    let from_self = match envelope.source() {
        Some(source) => Some(source) == local,
        None => true,
    };
    let wildcard = registry.listeners_for(ANY_SIGNAL);
    let exact = registry.listeners_for(envelope.name());
    if wildcard.is_empty() && exact.is_empty() {
        debug!(signal = %envelope.name(), "no listeners registered, dropping signal");
        return;
    }
    for listener in wildcard.into_iter().chain(exact) {
        let envelope = envelope.clone();
        tokio::spawn(async move {
            listener.on_signal(&envelope, from_self);
        });
    }
}
