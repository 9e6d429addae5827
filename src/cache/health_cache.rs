//! The node → health record map and its streaming tasks.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::cache::stream::run_health_stream;
use crate::cache::{HealthError, HealthRecord};
use crate::config::CacheConfig;
use crate::observability::metrics;
use crate::topology::{Directory, NodeId};
use crate::transport::HealthDialer;

/// Caches the latest health message of every node someone is asking about.
///
/// The first `get` for a node opens a health stream to it; later calls share
/// that stream. A stream closes itself once nobody has read it for the
/// keep-alive period, or when it fails, and the next `get` opens a new one.
pub struct HealthCache<M: Send + Sync + 'static> {
    inner: Arc<CacheInner<M>>,
}

impl<M: Send + Sync + 'static> Clone for HealthCache<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CacheInner<M: Send + Sync + 'static> {
    entries: DashMap<NodeId, Arc<HealthRecord<M>>>,
    directory: Arc<dyn Directory>,
    dialer: Arc<dyn HealthDialer<Message = M>>,
    keep_alive: Duration,
    /// Parent of every streaming task's cancellation token.
    root: CancellationToken,
}

impl<M: Send + Sync + 'static> HealthCache<M> {
    pub fn new(
        directory: Arc<dyn Directory>,
        dialer: Arc<dyn HealthDialer<Message = M>>,
        keep_alive: Duration,
    ) -> Self {
        Self::with_root(directory, dialer, keep_alive, CancellationToken::new())
    }

    /// Like `new`, but streaming tasks also stop when `root` is cancelled.
    ///
    /// `shutdown` cancels `root` itself, so pass a child token to keep the
    /// caller's own scope alive.
    pub fn with_root(
        directory: Arc<dyn Directory>,
        dialer: Arc<dyn HealthDialer<Message = M>>,
        keep_alive: Duration,
        root: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                directory,
                dialer,
                keep_alive,
                root,
            }),
        }
    }

    pub fn from_config(
        directory: Arc<dyn Directory>,
        dialer: Arc<dyn HealthDialer<Message = M>>,
        config: &CacheConfig,
        root: CancellationToken,
    ) -> Self {
        Self::with_root(directory, dialer, config.keep_alive(), root)
    }

    pub fn keep_alive(&self) -> Duration {
        self.inner.keep_alive
    }

    /// Latest health message for `node`.
    ///
    /// Waits for the first message if the stream is new. Returns `Ok(None)`
    /// only if the node closed the stream before sending anything. Cancelling
    /// `cancel` abandons this wait alone; the stream keeps running.
    pub async fn get(
        &self,
        cancel: &CancellationToken,
        node: &NodeId,
    ) -> Result<Option<Arc<M>>, HealthError> {
        let record = self.record_for(node);

        let outcome = record
            .await_latest(cancel)
            .await
            .and_then(|snapshot| snapshot.into_result());

        match &outcome {
            Ok(_) => metrics::record_get("ok"),
            Err(e) => {
                if !e.is_caller_local() {
                    tracing::debug!(node = %node, error = %e, "Health read saw terminal stream error");
                }
                metrics::record_get(e.kind());
            }
        }
        outcome
    }

    /// `get` bounded by a deadline.
    pub async fn get_timeout(
        &self,
        node: &NodeId,
        timeout: Duration,
    ) -> Result<Option<Arc<M>>, HealthError> {
        self.get_with_deadline(&CancellationToken::new(), node, timeout)
            .await
    }

    /// `get` bounded by both `cancel` and a deadline, whichever comes first.
    pub async fn get_with_deadline(
        &self,
        cancel: &CancellationToken,
        node: &NodeId,
        timeout: Duration,
    ) -> Result<Option<Arc<M>>, HealthError> {
        match time::timeout(timeout, self.get(cancel, node)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                metrics::record_get("deadline");
                Err(HealthError::DeadlineExceeded(timeout))
            }
        }
    }

    /// Find the live record for `node`, starting a stream if there is none.
    fn record_for(&self, node: &NodeId) -> Arc<HealthRecord<M>> {
        // The shard lock is released at the end of this statement.
        let (record, created) = match self.inner.entries.entry(node.clone()) {
            // Finished but not yet forgotten: replace it.
            Entry::Occupied(mut entry) if entry.get().is_done() => {
                let record = Arc::new(HealthRecord::new());
                entry.insert(Arc::clone(&record));
                (record, true)
            }
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let record = Arc::new(HealthRecord::new());
                entry.insert(Arc::clone(&record));
                (record, true)
            }
        };

        if created {
            self.spawn_stream(node.clone(), Arc::clone(&record));
        }
        record
    }

    fn spawn_stream(&self, node: NodeId, record: Arc<HealthRecord<M>>) {
        let inner = Arc::clone(&self.inner);
        let cancel = inner.root.child_token();

        tokio::spawn(async move {
            tracing::info!(node = %node, stream_id = %record.stream_id(), "Starting health stream");
            metrics::record_stream_started();

            let result = run_health_stream(
                inner.directory.as_ref(),
                inner.dialer.as_ref(),
                &node,
                &record,
                inner.keep_alive,
                cancel,
            )
            .await;

            let err = match result {
                Ok(end) => {
                    tracing::info!(
                        node = %node,
                        stream_id = %record.stream_id(),
                        reason = end.label(),
                        "Health stream ended"
                    );
                    metrics::record_stream_ended(end.label());
                    None
                }
                Err(e) => {
                    tracing::info!(
                        node = %node,
                        stream_id = %record.stream_id(),
                        error = %e,
                        "Health stream ended"
                    );
                    metrics::record_stream_ended(e.kind());
                    Some(e)
                }
            };

            record.mark_done(err);
            inner.forget(&node, &record);
        });
    }

    /// Whether a record for `node` is currently in the map.
    pub fn is_tracking(&self, node: &NodeId) -> bool {
        self.inner.entries.contains_key(node)
    }

    /// Nodes currently in the map, sorted.
    pub fn tracked_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<_> = self.inner.entries.iter().map(|r| r.key().clone()).collect();
        nodes.sort();
        nodes
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Stop every streaming task.
    ///
    /// Waiters of a stream with no message yet receive `HealthError::Shutdown`.
    pub fn shutdown(&self) {
        tracing::info!(streams = self.len(), "Shutting down health streams");
        self.inner.root.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.root.is_cancelled()
    }
}

impl<M: Send + Sync + 'static> CacheInner<M> {
    /// Remove `node` only if it still maps to `record`.
    fn forget(&self, node: &NodeId, record: &Arc<HealthRecord<M>>) -> bool {
        self.entries
            .remove_if(node, |_, current| Arc::ptr_eq(current, record))
            .is_some()
    }
}
