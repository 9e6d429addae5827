//! The dialer seam between the cache and the wire.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::topology::Endpoint;

/// Errors reported by a health transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The connection was not established in time.
    #[error("connect timed out after {0} seconds")]
    ConnectTimeout(u64),

    /// Mid-stream I/O failure.
    #[error("stream I/O error: {0}")]
    Io(String),

    /// The peer sent something that is not a health message.
    #[error("malformed health message: {0}")]
    Decode(String),

    /// The supplied cancellation scope fired.
    #[error("transport cancelled")]
    Cancelled,
}

/// A lazy sequence of health messages.
///
/// `None` is a clean end of stream; an `Err` item is a failure and the last
/// item produced. Dropping the stream releases the connection.
pub type HealthStream<M> = BoxStream<'static, Result<M, TransportError>>;

/// Opens health streams to node endpoints.
#[async_trait]
pub trait HealthDialer: Send + Sync {
    /// The opaque message type carried by the stream.
    type Message: Send + Sync + 'static;

    /// Connect to `endpoint` and request health updates.
    ///
    /// No session or keyspace context is sent. `cancel` aborts a pending
    /// connect.
    async fn open_health_stream(
        &self,
        endpoint: &Endpoint,
        cancel: CancellationToken,
    ) -> Result<HealthStream<Self::Message>, TransportError>;
}
