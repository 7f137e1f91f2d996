//! Signal pipeline module.
//!
//! Implements the optional processing stage between raw signal traffic and
//! its final delivery:
//! - `SignalEnvelope`: immutable record of one signal transit
//! - `SignalProtocol`: pluggable, hot-swappable transform strategy
//! - `SignalWorker`: dedicated serialized worker, one per direction
//!
//! The session facade wires one worker per direction (inbound, outbound) and
//! bypasses them entirely while no protocol is configured.

pub mod envelope;
pub mod protocol;
pub mod worker;

#[cfg(test)]
mod proptests;

pub use envelope::SignalEnvelope;
pub use protocol::{Passthrough, ProtocolError, SignalProtocol};
pub use worker::{SignalSink, SignalWorker};
