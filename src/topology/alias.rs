//! Node identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a single cluster member: the cell it lives in plus a numeric uid.
///
/// The canonical text form is `<cell>-<uid>` with the uid zero-padded to ten
/// digits, e.g. `zone1-0000000100`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub cell: String,
    pub uid: u32,
}

impl NodeId {
    pub fn new(cell: impl Into<String>, uid: u32) -> Self {
        Self {
            cell: cell.into(),
            uid,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:010}", self.cell, self.uid)
    }
}

/// Errors produced while parsing a node alias.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasParseError {
    #[error("node alias {0:?} is missing the '-' separator")]
    MissingSeparator(String),

    #[error("node alias {0:?} has an empty cell")]
    EmptyCell(String),

    #[error("node alias {alias:?} has an invalid uid: {reason}")]
    InvalidUid { alias: String, reason: String },
}

impl FromStr for NodeId {
    type Err = AliasParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Cells may contain '-', the uid never does.
        let (cell, uid) = s
            .rsplit_once('-')
            .ok_or_else(|| AliasParseError::MissingSeparator(s.to_string()))?;

        if cell.is_empty() {
            return Err(AliasParseError::EmptyCell(s.to_string()));
        }

        let uid = uid.parse::<u32>().map_err(|e| AliasParseError::InvalidUid {
            alias: s.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(cell, uid))
    }
}
