//! Tool domain model.
//!
//! A tool is a gated feature module (helpdesk, CRM, invoicing, ...) that
//! operators can switch on or off platform-wide.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OpsError, OpsResult};

/// Stable identifier naming a gated capability (e.g. `crm`).
///
/// Always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolKey(String);

impl ToolKey {
    pub const ASSETS: &'static str = "assets";
    pub const ATTENDANCE: &'static str = "attendance";
    pub const CRM: &'static str = "crm";
    pub const HELPDESK: &'static str = "helpdesk";
    pub const INVOICING: &'static str = "invoicing";

    pub fn new(raw: impl Into<String>) -> OpsResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(OpsError::Validation {
                message: "tool key must not be empty".into(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ToolKey {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ToolKey {
    type Error = OpsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToolKey> for String {
    fn from(key: ToolKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: Uuid,
    pub key: ToolKey,
    /// Display name (e.g., `Help Desk`).
    pub name: String,
    /// Operator switch. Inactive tools are hidden from everyone except
    /// super-admins.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTool {
    pub key: ToolKey,
    pub name: String,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_key_is_trimmed() {
        let key = ToolKey::new("  crm ").unwrap();
        assert_eq!(key.as_str(), ToolKey::CRM);
        assert_eq!(key.to_string(), "crm");
    }

    #[test]
    fn blank_tool_key_is_rejected() {
        assert!(matches!(
            ToolKey::new("   "),
            Err(OpsError::Validation { .. })
        ));
        assert!("".parse::<ToolKey>().is_err());
    }

    #[test]
    fn tool_key_deserializes_through_validation() {
        let key: ToolKey = serde_json::from_str("\"helpdesk\"").unwrap();
        assert_eq!(key.as_str(), ToolKey::HELPDESK);
        assert!(serde_json::from_str::<ToolKey>("\"\"").is_err());
    }
}
