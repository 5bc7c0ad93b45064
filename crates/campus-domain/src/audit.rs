//! Audit trail domain types.

use serde::{Deserialize, Serialize};

/// Kind of account mutation recorded in the audit trail.
///
/// Stored as its canonical uppercase tag; display localization happens
/// in the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
}

impl AuditAction {
    /// Canonical tag persisted in the audit store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
        }
    }

    /// Parse a persisted tag. Returns `None` for unknown values.
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(Self::Created),
            "UPDATED" => Some(Self::Updated),
            "DELETED" => Some(Self::Deleted),
            _ => None,
        }
    }
}
