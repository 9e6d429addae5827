//! Node Health Stream Cache Library

pub mod cache;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod topology;
pub mod transport;

pub use cache::{HealthCache, HealthError};
pub use config::HealthCacheConfig;
pub use lifecycle::Shutdown;
pub use topology::NodeId;
