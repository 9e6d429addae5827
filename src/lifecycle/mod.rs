//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build directory + dialer → HealthCache
//!
//! Shutdown (shutdown.rs):
//!     Signal received → cancel root token → streaming tasks exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_cache, build_cache_under, StartupError};
