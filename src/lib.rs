//! Chorus - multi-listener session facade
//!
//! A thin layer over a third-party real-time video session SDK adding:
//! - multi-listener fan-out where the base SDK supports one listener per
//!   event type
//! - optional pluggable signal-protocol pipelines that intercept, transform,
//!   or filter signaling messages before dispatch (inbound) or before the
//!   wire (outbound)
//!
//! Key principles:
//! - the SDK stays a black box behind `SessionTransport`
//! - one serialized worker per pipeline direction, FIFO per worker
//! - each signal listener invocation runs isolated on its own task
//! - failures are logged, never propagated to callers

pub mod session;
pub mod signal;

pub use session::{FacadeConfig, MockTransport, SessionFacade, SessionTransport};
pub use signal::{SignalEnvelope, SignalProtocol, SignalWorker};
