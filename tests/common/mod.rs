//! Shared fakes for integration testing.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use health_stream_cache::topology::{Directory, DirectoryError, Endpoint, NodeId};
use health_stream_cache::transport::{HealthDialer, HealthStream, TransportError};
use health_stream_cache::{HealthCache, HealthError};

/// A directory that counts lookups and either always fails or maps every
/// node to `fake:<uid>`.
#[derive(Default)]
pub struct FakeDirectory {
    pub resolves: AtomicUsize,
    pub fail: bool,
}

impl FakeDirectory {
    pub fn failing() -> Self {
        Self {
            resolves: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn resolve_endpoint(&self, node: &NodeId) -> Result<Endpoint, DirectoryError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DirectoryError::Lookup(format!("no such node {}", node)));
        }
        Ok(Endpoint::new("fake", node.uid as u16))
    }
}

type Item = Result<String, TransportError>;

/// Test-side control of one opened health stream.
pub struct StreamHandle {
    pub endpoint: Endpoint,
    tx: mpsc::UnboundedSender<(Item, oneshot::Sender<()>)>,
}

impl StreamHandle {
    /// Deliver one item and wait until the streaming task has handled it.
    ///
    /// Returns `true` if the task asked for another item afterwards, `false`
    /// if it dropped the stream instead.
    pub async fn push(&self, item: Item) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send((item, ack_tx)).is_err() {
            return false;
        }
        ack_rx.await.is_ok()
    }

    pub async fn send(&self, message: &str) -> bool {
        self.push(Ok(message.to_string())).await
    }

    /// End the stream cleanly.
    pub fn close(self) {}
}

/// A dialer whose streams are driven by the test through `StreamHandle`s.
pub struct ScriptedDialer {
    pub dials: AtomicUsize,
    pub fail: Option<TransportError>,
    handles: mpsc::UnboundedSender<StreamHandle>,
}

impl ScriptedDialer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StreamHandle>) {
        let (handles, rx) = mpsc::unbounded_channel();
        (
            Self {
                dials: AtomicUsize::new(0),
                fail: None,
                handles,
            },
            rx,
        )
    }

    pub fn failing(err: TransportError) -> Self {
        let (mut dialer, _) = Self::new();
        dialer.fail = Some(err);
        dialer
    }

    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthDialer for ScriptedDialer {
    type Message = String;

    async fn open_health_stream(
        &self,
        endpoint: &Endpoint,
        _cancel: CancellationToken,
    ) -> Result<HealthStream<String>, TransportError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = self.handles.send(StreamHandle {
            endpoint: endpoint.clone(),
            tx,
        });

        // An item is acknowledged when the consumer polls for the next one.
        let stream = stream::unfold((rx, None::<oneshot::Sender<()>>), |(mut rx, ack)| async move {
            if let Some(ack) = ack {
                let _ = ack.send(());
            }
            let Some((item, ack)) = rx.recv().await else {
                return None;
            };
            Some((item, (rx, Some(ack))))
        });
        Ok(stream.boxed())
    }
}

/// Start a `get` in the background.
pub fn spawn_get(
    cache: &HealthCache<String>,
    node: &NodeId,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<Result<Option<Arc<String>>, HealthError>> {
    let cache = cache.clone();
    let node = node.clone();
    tokio::spawn(async move { cache.get(&cancel, &node).await })
}

/// Receive the next opened stream, failing the test after a second.
pub async fn next_stream(handles: &mut mpsc::UnboundedReceiver<StreamHandle>) -> StreamHandle {
    tokio::time::timeout(Duration::from_secs(1), handles.recv())
        .await
        .expect("no stream opened")
        .expect("dialer dropped")
}

/// Poll `cond` until it holds, failing the test after two seconds.
pub async fn eventually(what: &str, cond: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !cond() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Unwrap a `get` result expected to carry a message.
pub fn message(outcome: Result<Option<Arc<String>>, HealthError>) -> String {
    outcome
        .expect("get failed")
        .map(|m| m.as_ref().clone())
        .expect("no message")
}
