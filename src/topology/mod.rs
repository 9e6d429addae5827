//! Node topology subsystem.
//!
//! # Data Flow
//! ```text
//! NodeId (cell + uid)
//!     → Directory::resolve_endpoint
//!     → Endpoint (host:port)
//!     → handed to the transport dialer
//! ```
//!
//! # Design Decisions
//! - `NodeId` is only ever used as a map key and a log field
//! - Directory implementations are injected, never looked up globally
//! - `StaticDirectory` is backed by the `nodes` section of the config file

pub mod alias;
pub mod directory;
pub mod endpoint;

pub use alias::{AliasParseError, NodeId};
pub use directory::{Directory, DirectoryError, StaticDirectory};
pub use endpoint::{Endpoint, EndpointParseError};
