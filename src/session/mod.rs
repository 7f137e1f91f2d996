//! Session facade module.
//!
//! Multi-listener fan-out over a single-callback session SDK:
//! - `SessionTransport`: the black-box SDK seam (plus `MockTransport`)
//! - listener registries and observer traits for every event category
//! - `SessionFacade`: event wiring and the per-direction signal pipelines

pub mod facade;
pub mod listeners;
pub mod mock;
pub mod stream;
pub mod traits;

pub use facade::{FacadeConfig, SessionFacade};
pub use listeners::{
    ArchiveObserver, ConnectionObserver, ListenerRegistry, ObserverList, ReconnectionObserver,
    SessionObserver, SignalListener, StreamPropertyObserver, ANY_SIGNAL,
};
pub use mock::{MockTransport, RawSend};
pub use stream::{ReceivedSignal, SignalStream};
pub use traits::{
    Connection, ConnectionId, SessionError, SessionEvent, SessionResult, SessionTransport, Stream,
    StreamId, VideoType,
};
