//! Dialer registry keyed by protocol name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::transport::{HealthDialer, HealthReport, TcpDialer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("dialer for protocol {0:?} is already registered")]
    DuplicateProtocol(String),

    #[error("no dialer registered for protocol {0:?}")]
    UnknownProtocol(String),
}

/// Maps protocol names to dialers producing messages of type `M`.
pub struct DialerRegistry<M: Send + Sync + 'static> {
    dialers: HashMap<String, Arc<dyn HealthDialer<Message = M>>>,
}

impl<M: Send + Sync + 'static> Default for DialerRegistry<M> {
    fn default() -> Self {
        Self {
            dialers: HashMap::new(),
        }
    }
}

impl<M: Send + Sync + 'static> DialerRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dialer` under `name`. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        dialer: Arc<dyn HealthDialer<Message = M>>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.dialers.contains_key(&name) {
            return Err(RegistryError::DuplicateProtocol(name));
        }
        tracing::debug!(protocol = %name, "Registered health dialer");
        self.dialers.insert(name, dialer);
        Ok(())
    }

    /// Look up the dialer for `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn HealthDialer<Message = M>>, RegistryError> {
        self.dialers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownProtocol(name.to_string()))
    }

    /// Registered protocol names, sorted.
    pub fn protocols(&self) -> Vec<String> {
        let mut names: Vec<_> = self.dialers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl DialerRegistry<HealthReport> {
    /// A registry holding the built-in `tcp` dialer.
    pub fn with_defaults(connect_timeout: Duration) -> Self {
        let mut registry = Self::new();
        registry
            .dialers
            .insert(TcpDialer::PROTOCOL.to_string(), Arc::new(TcpDialer::new(connect_timeout)));
        registry
    }
}
