//! Tenant domain model.
//!
//! A tenant is either an organization or a personal account. It scopes
//! data and tool entitlements for every user that belongs to it.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tool::ToolKey;
use crate::error::OpsError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Single-user account. Every active tool is available.
    Personal,
    /// Multi-user account. Tools are granted per user.
    Organization,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Personal => "personal",
            AccountKind::Organization => "organization",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(AccountKind::Personal),
            "organization" => Ok(AccountKind::Organization),
            other => Err(OpsError::Validation {
                message: format!("unknown account kind: {other:?}"),
            }),
        }
    }
}

/// A validated tenant, as held by the tenant context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// Subscription plan name (e.g., `free`, `pro`).
    pub plan: String,
    /// Tools switched on for this tenant.
    pub active_tools: BTreeSet<ToolKey>,
    pub logo_url: Option<String>,
    /// IANA timezone name (e.g., `Europe/London`).
    pub timezone: String,
    pub account_kind: AccountKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn has_tool_enabled(&self, key: &ToolKey) -> bool {
        self.active_tools.contains(key)
    }

    pub fn is_personal(&self) -> bool {
        self.account_kind == AccountKind::Personal
    }
}

/// A tenant row as stored, before `account_type` is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: Uuid,
    pub name: String,
    pub plan: String,
    pub active_tools: Vec<String>,
    pub logo_url: Option<String>,
    pub timezone: String,
    /// Raw account type. Only `personal` and `organization` are valid.
    pub account_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRecord {
    /// Build a [`Tenant`] using an already-normalized account kind.
    ///
    /// Blank tool keys in `active_tools` are skipped.
    pub fn into_tenant(self, account_kind: AccountKind) -> Tenant {
        Tenant {
            id: self.id,
            name: self.name,
            plan: self.plan,
            active_tools: self
                .active_tools
                .into_iter()
                .filter_map(|k| ToolKey::new(k).ok())
                .collect(),
            logo_url: self.logo_url,
            timezone: self.timezone,
            account_kind,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub plan: String,
    pub active_tools: Vec<ToolKey>,
    pub logo_url: Option<String>,
    pub timezone: String,
    pub account_kind: AccountKind,
}

/// Fields that can be updated on an existing tenant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub plan: Option<String>,
    pub active_tools: Option<Vec<ToolKey>>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub logo_url: Option<Option<String>>,
    pub timezone: Option<String>,
    pub account_kind: Option<AccountKind>,
}
