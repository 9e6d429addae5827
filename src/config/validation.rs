//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (durations > 0, addresses parse)
//! - Detect duplicate node aliases
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HealthCacheConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::HealthCacheConfig;
use crate::topology::{Endpoint, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cache.keep_alive_secs must be greater than zero")]
    ZeroKeepAlive,

    #[error("transport.connect_timeout_secs must be greater than zero")]
    ZeroConnectTimeout,

    #[error("transport.protocol must not be empty")]
    EmptyProtocol,

    #[error("node #{0} has an empty cell")]
    EmptyCell(usize),

    #[error("node {0} is listed more than once")]
    DuplicateNode(NodeId),

    #[error("node {node} has invalid address {address:?}")]
    InvalidNodeAddress { node: NodeId, address: String },

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &HealthCacheConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cache.keep_alive_secs == 0 {
        errors.push(ValidationError::ZeroKeepAlive);
    }
    if config.transport.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if config.transport.protocol.trim().is_empty() {
        errors.push(ValidationError::EmptyProtocol);
    }

    let mut seen = HashSet::new();
    for (i, node) in config.nodes.iter().enumerate() {
        if node.cell.is_empty() {
            errors.push(ValidationError::EmptyCell(i));
            continue;
        }

        let id = NodeId::new(node.cell.clone(), node.uid);
        if node.address.parse::<Endpoint>().is_err() {
            errors.push(ValidationError::InvalidNodeAddress {
                node: id.clone(),
                address: node.address.clone(),
            });
        }
        if !seen.insert(id.clone()) {
            errors.push(ValidationError::DuplicateNode(id));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;

    fn node(cell: &str, uid: u32, address: &str) -> NodeConfig {
        NodeConfig {
            cell: cell.into(),
            uid,
            address: address.into(),
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&HealthCacheConfig::default()).is_ok());
    }

    #[test]
    fn test_node_errors() {
        let mut config = HealthCacheConfig::default();
        config.nodes = vec![
            node("zone1", 1, "db1:15999"),
            node("zone1", 1, "db1-copy:15999"),
            node("", 2, "db2:15999"),
            node("zone2", 3, "db3"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateNode(NodeId::new("zone1", 1)),
                ValidationError::EmptyCell(2),
                ValidationError::InvalidNodeAddress {
                    node: NodeId::new("zone2", 3),
                    address: "db3".into(),
                },
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = HealthCacheConfig::default();
        config.observability.metrics_address = "not-an-address".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidMetricsAddress("not-an-address".into())]
        );
    }
}
