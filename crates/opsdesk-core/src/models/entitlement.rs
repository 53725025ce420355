//! Per-tool entitlement model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tool::ToolKey;

/// Grants one user of an organization tenant the use of one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAssignment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub tool_key: ToolKey,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateToolAssignment {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub tool_key: ToolKey,
}
