//! SurrealDB implementation of [`EntitlementRepository`].

use chrono::{DateTime, Utc};
use opsdesk_core::error::OpsResult;
use opsdesk_core::models::entitlement::{CreateToolAssignment, ToolAssignment};
use opsdesk_core::models::tool::ToolKey;
use opsdesk_core::repository::EntitlementRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for the freshly created record.
#[derive(Debug, SurrealValue)]
struct CreatedAssignmentRow {
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AssignmentRow {
    record_id: String,
    tenant_id: String,
    user_id: String,
    tool_key: String,
    created_at: DateTime<Utc>,
}

impl AssignmentRow {
    fn try_into_assignment(self) -> Result<ToolAssignment, DbError> {
        let id = parse_uuid(&self.record_id, "tool_assignment")?;
        let tool_key = ToolKey::new(self.tool_key)
            .map_err(|e| DbError::InvalidRecord(format!("tool_assignment {id}: {e}")))?;
        Ok(ToolAssignment {
            id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            tool_key,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the per-tool entitlement repository.
#[derive(Clone)]
pub struct SurrealEntitlementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEntitlementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EntitlementRepository for SurrealEntitlementRepository<C> {
    async fn assign(&self, input: CreateToolAssignment) -> OpsResult<ToolAssignment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tool_assignment', $id) SET \
                 tenant_id = $tenant_id, user_id = $user_id, tool_key = $tool_key",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("tool_key", input.tool_key.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CreatedAssignmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tool_assignment".into(),
            id: id_str,
        })?;

        Ok(ToolAssignment {
            id,
            tenant_id: input.tenant_id,
            user_id: input.user_id,
            tool_key: input.tool_key,
            created_at: row.created_at,
        })
    }

    async fn unassign(&self, user_id: Uuid, key: &ToolKey) -> OpsResult<()> {
        self.db
            .query("DELETE tool_assignment WHERE user_id = $user_id AND tool_key = $tool_key")
            .bind(("user_id", user_id.to_string()))
            .bind(("tool_key", key.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> OpsResult<Vec<ToolAssignment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tool_assignment \
                 WHERE user_id = $user_id ORDER BY tool_key ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AssignmentRow> = result.take(0).map_err(DbError::from)?;

        let assignments = rows
            .into_iter()
            .map(|row| row.try_into_assignment())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(assignments)
    }

    /// Only assignments in tenants the user still belongs to count;
    /// leaving a tenant revokes everything granted there.
    async fn user_has_tool_access(&self, user_id: Uuid, key: &ToolKey) -> OpsResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM tool_assignment \
                 WHERE user_id = $user_id AND tool_key = $tool_key \
                 AND tenant_id IN \
                 (SELECT VALUE tenant_id FROM tenant_member WHERE user_id = $user_id) \
                 GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("tool_key", key.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
