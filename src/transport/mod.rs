//! Health stream transport subsystem.
//!
//! # Data Flow
//! ```text
//! config.transport.protocol
//!     → DialerRegistry::get (registry.rs)
//!     → Arc<dyn HealthDialer> injected into the cache
//!
//! Streaming task:
//!     Endpoint → HealthDialer::open_health_stream (dialer.rs)
//!     → HealthStream (lazy, ends with None or an error item)
//!     → dropped on exit, which closes the connection
//! ```
//!
//! # Design Decisions
//! - Dialers are selected from an explicit registry value, not a global
//! - The stream item type is generic; `HealthReport` is the shipped schema
//! - Errors are `Clone` so a terminal error can be replayed to many waiters

pub mod dialer;
pub mod registry;
pub mod report;
pub mod tcp;

pub use dialer::{HealthDialer, HealthStream, TransportError};
pub use registry::{DialerRegistry, RegistryError};
pub use report::{HealthReport, RealtimeStats, Target};
pub use tcp::TcpDialer;
