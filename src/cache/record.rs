//! Per-node health state shared between one streaming task and its readers.
//!
//! # Responsibilities
//! - Hold the latest health message and the stream's terminal error
//! - Track when the record was last read, for idle eviction
//! - Provide the ready-or-done handshake readers wait on
//!
//! # Design Decisions
//! - Single writer (the owning task), many readers
//! - One mutex makes multi-field snapshots consistent; it is never held
//!   across an `.await`
//! - `ready` fires on the first message, `done` when the task exits

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cache::{HealthError, Signal};

/// Lifecycle of a record and its streaming task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Task running, no message yet.
    Pending,
    /// At least one message received.
    Live,
    /// Task exited.
    Terminated,
}

/// What a reader sees once a record is ready or done.
#[derive(Debug)]
pub struct Snapshot<M> {
    /// Latest message, if any arrived.
    pub result: Option<Arc<M>>,
    /// Terminal error; only set once the task has exited.
    pub error: Option<HealthError>,
}

impl<M> Snapshot<M> {
    /// Prefer the terminal error over a stale result.
    pub fn into_result(self) -> Result<Option<Arc<M>>, HealthError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}

struct RecordInner<M> {
    last_result: Option<Arc<M>>,
    last_accessed: Instant,
    terminal_error: Option<HealthError>,
}

/// Health state for one node, owned by one streaming task.
pub struct HealthRecord<M> {
    stream_id: Uuid,
    inner: Mutex<RecordInner<M>>,
    ready: Signal,
    done: Signal,
}

impl<M> HealthRecord<M> {
    /// A fresh record counts as accessed now.
    pub fn new() -> Self {
        Self {
            stream_id: Uuid::new_v4(),
            inner: Mutex::new(RecordInner {
                last_result: None,
                last_accessed: Instant::now(),
                terminal_error: None,
            }),
            ready: Signal::new(),
            done: Signal::new(),
        }
    }

    /// Identifies this stream attempt in logs.
    pub fn stream_id(&self) -> Uuid {
        self.stream_id
    }

    fn lock(&self) -> MutexGuard<'_, RecordInner<M>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for the first message or for the task to exit, whichever is first.
    ///
    /// Returns `HealthError::Cancelled` if `cancel` fires first, without
    /// touching the record. Otherwise marks the record as accessed and
    /// returns what it currently holds.
    pub async fn await_latest(&self, cancel: &CancellationToken) -> Result<Snapshot<M>, HealthError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(HealthError::Cancelled),
            _ = self.ready.fired() => {}
            _ = self.done.fired() => {}
        }

        let mut inner = self.lock();
        inner.last_accessed = Instant::now();
        Ok(Snapshot {
            result: inner.last_result.clone(),
            error: inner.terminal_error.clone(),
        })
    }

    /// Store the latest message. Only the owning task calls this.
    pub fn note_result(&self, value: M) {
        self.lock().last_result = Some(Arc::new(value));
        self.ready.fire();
    }

    /// Record the task's exit. Only the owning task calls this, once.
    pub fn mark_done(&self, err: Option<HealthError>) {
        self.lock().terminal_error = err;
        if !self.done.fire() {
            tracing::warn!(stream_id = %self.stream_id, "Health record marked done twice");
        }
    }

    /// Time since the last successful read.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.lock().last_accessed)
    }

    pub fn is_done(&self) -> bool {
        self.done.is_fired()
    }

    pub fn state(&self) -> RecordState {
        if self.done.is_fired() {
            RecordState::Terminated
        } else if self.ready.is_fired() {
            RecordState::Live
        } else {
            RecordState::Pending
        }
    }
}

impl<M> Default for HealthRecord<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for HealthRecord<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthRecord")
            .field("stream_id", &self.stream_id)
            .field("state", &self.state())
            .finish()
    }
}
