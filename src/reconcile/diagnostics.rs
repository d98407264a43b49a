//! Side channel for records that could not be placed on the canonical set
//!
//! Reporting never blocks and never fails: the resolver and merger run on
//! blocking worker threads and must not wait on log output.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Receives one human-readable message per unresolved or unmatched record
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, message: String);
}

/// Logs each message synchronously at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: String) {
        warn!("{}", message);
    }
}

/// Bounded channel drained by a background task.
///
/// When the buffer is full the message is discarded and counted in
/// [`ChannelSink::dropped`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<String>,
    dropped: Arc<AtomicUsize>,
}

impl ChannelSink {
    /// Create the sink and spawn its drain task on the current runtime.
    ///
    /// The task ends once every clone of the sink is dropped and yields the
    /// number of messages it forwarded.
    pub fn spawn(capacity: usize) -> (Self, JoinHandle<usize>) {
        let (sender, mut receiver) = mpsc::channel::<String>(capacity.max(1));

        let drain = tokio::spawn(async move {
            let mut forwarded = 0;
            while let Some(message) = receiver.recv().await {
                warn!("{}", message);
                forwarded += 1;
            }
            forwarded
        });

        let sink = Self {
            sender,
            dropped: Arc::new(AtomicUsize::new(0)),
        };
        (sink, drain)
    }

    /// Messages discarded because the channel was full or closed
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl DiagnosticSink for ChannelSink {
    fn report(&self, message: String) {
        if self.sender.try_send(message).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Keeps messages in memory, for callers that want to inspect them afterwards
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, message: String) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }
}
