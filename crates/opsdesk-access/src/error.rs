//! Resolution failures.
//!
//! These never reach callers of the gate or the tenant context. Each one
//! is logged where it happens and converted into the most restrictive
//! decision available.

use std::fmt;

use opsdesk_core::error::OpsError;
use thiserror::Error;
use uuid::Uuid;

/// The remote lookups the access layer performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    SuperAdmin,
    ToolActive,
    Entitlement,
    Tenant,
}

impl Lookup {
    pub fn as_str(self) -> &'static str {
        match self {
            Lookup::SuperAdmin => "super_admin",
            Lookup::ToolActive => "tool_active",
            Lookup::Entitlement => "entitlement",
            Lookup::Tenant => "tenant",
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{lookup} lookup failed for {key}: {source}")]
    Lookup {
        lookup: Lookup,
        key: String,
        #[source]
        source: OpsError,
    },

    #[error("{lookup} lookup for {key} timed out after {timeout_ms}ms")]
    TimedOut {
        lookup: Lookup,
        key: String,
        timeout_ms: u64,
    },

    #[error("expected at most one tenant for user {user_id}, found {rows}")]
    AmbiguousTenant { user_id: Uuid, rows: usize },

    #[error("tenant {tenant_id} has unknown account type {raw:?}")]
    UnknownAccountKind { tenant_id: Uuid, raw: String },
}
