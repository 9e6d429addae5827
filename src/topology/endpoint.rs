//! Network endpoints of cluster nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a node accepts health stream connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointParseError {
    #[error("missing port in {0:?}")]
    MissingPort(String),

    #[error("empty host in {0:?}")]
    EmptyHost(String),

    #[error("invalid port in {address:?}: {reason}")]
    InvalidPort { address: String, reason: String },
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| EndpointParseError::MissingPort(s.to_string()))?;

        if host.is_empty() {
            return Err(EndpointParseError::EmptyHost(s.to_string()));
        }

        let port = port.parse::<u16>().map_err(|e| EndpointParseError::InvalidPort {
            address: s.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ep: Endpoint = "db-7.internal:15999".parse().unwrap();
        assert_eq!(ep, Endpoint::new("db-7.internal", 15999));
        assert_eq!(ep.to_string(), "db-7.internal:15999");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "localhost".parse::<Endpoint>(),
            Err(EndpointParseError::MissingPort(_))
        ));
        assert!(matches!(
            ":80".parse::<Endpoint>(),
            Err(EndpointParseError::EmptyHost(_))
        ));
        assert!(matches!(
            "localhost:99999".parse::<Endpoint>(),
            Err(EndpointParseError::InvalidPort { .. })
        ));
    }
}
