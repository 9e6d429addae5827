//! Resolving node identifiers to endpoints.
//!
//! # Responsibilities
//! - Define the `Directory` seam consumed by the health cache
//! - Provide a config-backed implementation for static deployments

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::NodeConfig;
use crate::topology::{Endpoint, NodeId};

/// Errors returned by a node directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The directory has no record of the node.
    #[error("node {0} not found in directory")]
    UnknownNode(NodeId),

    /// The node is known but its address is unusable.
    #[error("node {node} has invalid address {address:?}: {reason}")]
    InvalidEndpoint {
        node: NodeId,
        address: String,
        reason: String,
    },

    /// Backend lookup failed.
    #[error("directory lookup failed: {0}")]
    Lookup(String),
}

/// Resolves a node to the endpoint serving its health stream.
///
/// Implementations must be safe to call concurrently for different nodes.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn resolve_endpoint(&self, node: &NodeId) -> Result<Endpoint, DirectoryError>;
}

/// A directory backed by a fixed node → address table.
///
/// Addresses are kept as written and parsed on each lookup, so a bad entry
/// only fails the node it belongs to.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    addresses: HashMap<NodeId, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `nodes` section of the configuration.
    pub fn from_config(nodes: &[NodeConfig]) -> Self {
        let mut directory = Self::new();
        for node in nodes {
            directory.insert(NodeId::new(node.cell.clone(), node.uid), node.address.clone());
        }
        directory
    }

    /// Add or replace a node's address.
    pub fn insert(&mut self, node: NodeId, address: impl Into<String>) {
        self.addresses.insert(node, address.into());
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn resolve_endpoint(&self, node: &NodeId) -> Result<Endpoint, DirectoryError> {
        let address = self
            .addresses
            .get(node)
            .ok_or_else(|| DirectoryError::UnknownNode(node.clone()))?;

        address
            .parse::<Endpoint>()
            .map_err(|e| DirectoryError::InvalidEndpoint {
                node: node.clone(),
                address: address.clone(),
                reason: e.to_string(),
            })
    }
}
