//! Listener traits and registries.
//!
//! The base SDK accepts a single listener per event type; these registries
//! layer multi-listener fan-out on top. Two shapes:
//! - `ListenerRegistry`: keyed by signal name, with the reserved wildcard key
//!   `"*"` meaning "all signal names"
//! - `ObserverList`: one ordered list per fixed event category
//!
//! Both deduplicate by listener identity (`Arc::ptr_eq`) and preserve
//! insertion order. Reads snapshot the current listeners so dispatch never
//! races a concurrent register/unregister.

use super::traits::{Connection, SessionError, Stream, VideoType};
use crate::signal::SignalEnvelope;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Reserved signal-name key matching every signal.
pub const ANY_SIGNAL: &str = "*";

/// Application listener for signal events.
///
/// Each invocation runs on its own spawned task: slow or panicking listeners
/// cannot delay siblings or the pipeline. `from_self` is true when the signal
/// originated from the local participant.
pub trait SignalListener: Send + Sync {
    fn on_signal(&self, envelope: &SignalEnvelope, from_self: bool);
}

/// Session lifecycle and media stream events.
#[allow(unused_variables)]
pub trait SessionObserver: Send + Sync {
    fn on_connected(&self) {}
    fn on_disconnected(&self) {}
    fn on_error(&self, error: &SessionError) {}
    fn on_stream_received(&self, stream: &Stream) {}
    fn on_stream_dropped(&self, stream: &Stream) {}
}

/// Participant connection lifecycle events.
#[allow(unused_variables)]
pub trait ConnectionObserver: Send + Sync {
    fn on_connection_created(&self, connection: &Connection) {}
    fn on_connection_destroyed(&self, connection: &Connection) {}
}

/// Per-stream property change events.
#[allow(unused_variables)]
pub trait StreamPropertyObserver: Send + Sync {
    fn on_stream_has_audio_changed(&self, stream: &Stream, enabled: bool) {}
    fn on_stream_has_video_changed(&self, stream: &Stream, enabled: bool) {}
    fn on_stream_video_dimensions_changed(&self, stream: &Stream, width: u32, height: u32) {}
    fn on_stream_video_type_changed(&self, stream: &Stream, video_type: VideoType) {}
}

/// Archive start/stop events.
#[allow(unused_variables)]
pub trait ArchiveObserver: Send + Sync {
    fn on_archive_started(&self, id: &str, name: Option<&str>) {}
    fn on_archive_stopped(&self, id: &str) {}
}

/// Session reconnection events.
pub trait ReconnectionObserver: Send + Sync {
    fn on_reconnecting(&self) {}
    fn on_reconnected(&self) {}
}

/// Keyed multi-listener registry with wildcard support.
pub struct ListenerRegistry<L: ?Sized> {
    entries: Mutex<HashMap<String, Vec<Arc<L>>>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Append a listener under a key unless the identical listener is
    /// already registered there. Insertion order is fan-out order.
    pub fn register(&self, key: &str, listener: Arc<L>) {
        let mut entries = self.entries.lock().unwrap();
        let bucket = entries.entry(key.to_string()).or_default();
        if bucket.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
            debug!(%key, "listener already registered, ignoring");
            return;
        }
        bucket.push(listener);
    }

    /// Remove a listener from every key it is registered under.
    pub fn unregister_all(&self, listener: &Arc<L>) {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, bucket| {
            bucket.retain(|existing| !Arc::ptr_eq(existing, listener));
            !bucket.is_empty()
        });
    }

    /// Remove a listener from one key; the key is dropped once empty.
    pub fn unregister(&self, key: &str, listener: &Arc<L>) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(bucket) = entries.get_mut(key) {
            bucket.retain(|existing| !Arc::ptr_eq(existing, listener));
            if bucket.is_empty() {
                entries.remove(key);
            }
        }
    }

    /// Snapshot of the listeners under one key, in registration order.
    pub fn listeners_for(&self, key: &str) -> Vec<Arc<L>> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Keys currently holding at least one listener.
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered identity-deduplicated observer list for one fixed event category.
pub struct ObserverList<L: ?Sized> {
    observers: Mutex<Vec<Arc<L>>>,
}

impl<L: ?Sized> ObserverList<L> {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Append unless the identical observer is already present.
    pub fn add(&self, observer: Arc<L>) {
        let mut observers = self.observers.lock().unwrap();
        if !observers.iter().any(|existing| Arc::ptr_eq(existing, &observer)) {
            observers.push(observer);
        }
    }

    pub fn remove(&self, observer: &Arc<L>) {
        self.observers
            .lock()
            .unwrap()
            .retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    /// Snapshot in registration order.
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.observers.lock().unwrap().clone()
    }
}

impl<L: ?Sized> Default for ObserverList<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder;
    impl SignalListener for Recorder {
        fn on_signal(&self, _envelope: &SignalEnvelope, _from_self: bool) {}
    }

    fn listener() -> Arc<dyn SignalListener> {
        Arc::new(Recorder)
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry: ListenerRegistry<dyn SignalListener> = ListenerRegistry::new();
        let l = listener();
        registry.register("chat", Arc::clone(&l));
        registry.register("chat", Arc::clone(&l));
        assert_eq!(registry.listeners_for("chat").len(), 1);
    }

    #[test]
    fn test_same_listener_under_two_keys() {
        let registry: ListenerRegistry<dyn SignalListener> = ListenerRegistry::new();
        let l = listener();
        registry.register("chat", Arc::clone(&l));
        registry.register(ANY_SIGNAL, Arc::clone(&l));
        assert_eq!(registry.listeners_for("chat").len(), 1);
        assert_eq!(registry.listeners_for(ANY_SIGNAL).len(), 1);
    }

    #[test]
    fn test_unregister_all_clears_every_key() {
        let registry: ListenerRegistry<dyn SignalListener> = ListenerRegistry::new();
        let l = listener();
        let other = listener();
        registry.register("chat", Arc::clone(&l));
        registry.register("status", Arc::clone(&l));
        registry.register("status", Arc::clone(&other));
        registry.unregister_all(&l);

        assert!(registry.listeners_for("chat").is_empty());
        assert_eq!(registry.listeners_for("status").len(), 1);
        // Emptied keys are dropped entirely.
        assert_eq!(registry.keys(), vec!["status".to_string()]);
    }

    #[test]
    fn test_unregister_single_key_drops_empty_key() {
        let registry: ListenerRegistry<dyn SignalListener> = ListenerRegistry::new();
        let l = listener();
        registry.register("chat", Arc::clone(&l));
        registry.register("status", Arc::clone(&l));
        registry.unregister("chat", &l);

        assert!(registry.listeners_for("chat").is_empty());
        assert_eq!(registry.listeners_for("status").len(), 1);
        assert_eq!(registry.keys(), vec!["status".to_string()]);
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry: ListenerRegistry<dyn SignalListener> = ListenerRegistry::new();
        let first = listener();
        let second = listener();
        registry.register("chat", Arc::clone(&first));
        registry.register("chat", Arc::clone(&second));

        let snapshot = registry.listeners_for("chat");
        assert!(Arc::ptr_eq(&snapshot[0], &first));
        assert!(Arc::ptr_eq(&snapshot[1], &second));
    }

    #[test]
    fn test_observer_list_dedup_and_order() {
        struct Obs;
        impl SessionObserver for Obs {}

        let list: ObserverList<dyn SessionObserver> = ObserverList::new();
        let first: Arc<dyn SessionObserver> = Arc::new(Obs);
        let second: Arc<dyn SessionObserver> = Arc::new(Obs);
        list.add(Arc::clone(&first));
        list.add(Arc::clone(&second));
        list.add(Arc::clone(&first));

        let snapshot = list.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot[0], &first));
        assert!(Arc::ptr_eq(&snapshot[1], &second));

        list.remove(&first);
        assert_eq!(list.snapshot().len(), 1);
    }
}
