//! Node health stream cache.
//!
//! # Data Flow
//! ```text
//! HealthCache::get(node)
//!     → entries lookup under the shard lock (health_cache.rs)
//!     → miss: insert HealthRecord, spawn streaming task (stream.rs)
//!     → HealthRecord::await_latest (record.rs), outside the shard lock
//!
//! Streaming task (one per tracked node):
//!     Directory::resolve_endpoint
//!     → HealthDialer::open_health_stream
//!     → note_result for every message, idle check after each
//!     → mark_done(error) → forget(node, record)
//! ```
//!
//! # Record states
//! ```text
//! Pending ──first message──▶ Live
//! Pending | Live ──task exit──▶ Terminated (final, record discarded)
//! ```
//!
//! # Design Decisions
//! - Exactly one live record, and so one stream, per node
//! - Records are written only by their task and read by any number of callers
//! - Caller cancellation only affects that caller's wait
//! - No retry inside the cache: the next `get` after a failure starts afresh

pub mod error;
pub mod health_cache;
pub mod record;
pub mod signal;
mod stream;

pub use error::HealthError;
pub use health_cache::HealthCache;
pub use record::{HealthRecord, RecordState, Snapshot};
pub use signal::Signal;
