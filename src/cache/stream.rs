//! The per-node streaming task body.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cache::{HealthError, HealthRecord};
use crate::topology::{Directory, NodeId};
use crate::transport::{HealthDialer, TransportError};

/// How a stream ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamEnd {
    /// Nobody read the record for the keep-alive period.
    Idle,
    /// The node closed the stream.
    Closed,
}

impl StreamEnd {
    pub(crate) fn label(self) -> &'static str {
        match self {
            StreamEnd::Idle => "idle",
            StreamEnd::Closed => "closed",
        }
    }
}

/// Resolve, dial, then copy messages into `record` until the stream ends.
///
/// The stream is dropped, closing the connection, on every return path.
pub(crate) async fn run_health_stream<M>(
    directory: &dyn Directory,
    dialer: &dyn HealthDialer<Message = M>,
    node: &NodeId,
    record: &HealthRecord<M>,
    keep_alive: Duration,
    cancel: CancellationToken,
) -> Result<StreamEnd, HealthError>
where
    M: Send + Sync + 'static,
{
    let endpoint = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(HealthError::Shutdown),
        res = directory.resolve_endpoint(node) => res.map_err(HealthError::Resolve)?,
    };

    let mut stream = dialer
        .open_health_stream(&endpoint, cancel.clone())
        .await
        .map_err(|e| match e {
            TransportError::Cancelled => HealthError::Shutdown,
            e => HealthError::Connect(e),
        })?;

    tracing::debug!(
        node = %node,
        endpoint = %endpoint,
        stream_id = %record.stream_id(),
        "Health stream open"
    );

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(HealthError::Shutdown),
            next = stream.next() => next,
        };

        match next {
            Some(Ok(message)) => {
                record.note_result(message);
                if record.idle_for(Instant::now()) >= keep_alive {
                    return Ok(StreamEnd::Idle);
                }
            }
            Some(Err(TransportError::Cancelled)) => return Err(HealthError::Shutdown),
            Some(Err(e)) => return Err(HealthError::Stream(e)),
            None => return Ok(StreamEnd::Closed),
        }
    }
}
