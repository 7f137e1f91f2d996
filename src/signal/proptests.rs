//! Property-based tests for the signal worker.
//!
//! Properties:
//! - FIFO: outputs reach the completion sink in submission order
//! - Order under expansion: a protocol that multiplies envelopes keeps the
//!   relative order of its inputs

use super::envelope::SignalEnvelope;
use super::protocol::{Passthrough, ProtocolError, SignalProtocol};
use super::worker::{SignalSink, SignalWorker};
use proptest::prelude::*;
use tokio::sync::mpsc;

/// Emits every envelope twice.
struct Duplicate;

impl SignalProtocol for Duplicate {
    fn process(&mut self, envelope: SignalEnvelope) -> Result<Vec<SignalEnvelope>, ProtocolError> {
        Ok(vec![envelope.clone(), envelope])
    }
}

fn channel_sink() -> (SignalSink, mpsc::UnboundedReceiver<SignalEnvelope>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink: SignalSink = Box::new(move |envelope| {
        let tx = tx.clone();
        Box::pin(async move {
            let _ = tx.send(envelope);
        })
    });
    (sink, rx)
}

fn run_through(
    protocol: Box<dyn SignalProtocol>,
    payloads: Vec<String>,
    outputs_per_input: usize,
) -> Vec<SignalEnvelope> {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async move {
        let (sink, mut rx) = channel_sink();
        let worker = SignalWorker::spawn(Some(protocol), sink);
        let expected = payloads.len() * outputs_per_input;
        for payload in payloads {
            worker.submit(SignalEnvelope::new("prop", Some(payload)));
        }
        let mut outputs = Vec::with_capacity(expected);
        for _ in 0..expected {
            outputs.push(rx.recv().await.expect("worker output channel closed"));
        }
        outputs
    })
}

proptest! {
    /// For all submission sequences, the sink sees them in the same order.
    #[test]
    fn prop_fifo_order(payloads in proptest::collection::vec("[a-z0-9]{0,12}", 0..40)) {
        let outputs = run_through(Box::new(Passthrough), payloads.clone(), 1);
        let got: Vec<_> = outputs
            .iter()
            .map(|e| e.payload().unwrap_or("").to_string())
            .collect();
        prop_assert_eq!(got, payloads);
    }

    /// A protocol producing several outputs per input keeps input order.
    #[test]
    fn prop_expansion_keeps_relative_order(payloads in proptest::collection::vec("[a-z0-9]{0,12}", 0..20)) {
        let outputs = run_through(Box::new(Duplicate), payloads.clone(), 2);
        let expected: Vec<String> = payloads
            .into_iter()
            .flat_map(|p| [p.clone(), p])
            .collect();
        let got: Vec<_> = outputs
            .iter()
            .map(|e| e.payload().unwrap_or("").to_string())
            .collect();
        prop_assert_eq!(got, expected);
    }
}
