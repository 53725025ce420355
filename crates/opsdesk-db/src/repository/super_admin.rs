//! SurrealDB implementation of [`SuperAdminRepository`].

use chrono::{DateTime, Utc};
use opsdesk_core::error::OpsResult;
use opsdesk_core::models::super_admin::SuperAdminGrant;
use opsdesk_core::repository::SuperAdminRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct GrantRow {
    record_id: String,
    user_id: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GrantRow {
    fn try_into_grant(self) -> Result<SuperAdminGrant, DbError> {
        Ok(SuperAdminGrant {
            id: parse_uuid(&self.record_id, "super_admin")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the super-admin repository.
#[derive(Clone)]
pub struct SurrealSuperAdminRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSuperAdminRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<GrantRow>, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM super_admin WHERE user_id = $user_id")
            .bind(("user_id", user_id.to_string()))
            .await?;
        let rows: Vec<GrantRow> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> SuperAdminRepository for SurrealSuperAdminRepository<C> {
    async fn grant(&self, user_id: Uuid) -> OpsResult<SuperAdminGrant> {
        let query = match self.find(user_id).await? {
            Some(existing) => self
                .db
                .query(
                    "UPDATE type::record('super_admin', $id) SET \
                     is_active = true, updated_at = time::now()",
                )
                .bind(("id", existing.record_id)),
            None => self
                .db
                .query("CREATE type::record('super_admin', $id) SET user_id = $user_id")
                .bind(("id", Uuid::new_v4().to_string()))
                .bind(("user_id", user_id.to_string())),
        };

        query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let row = self.find(user_id).await?.ok_or_else(|| DbError::NotFound {
            entity: "super_admin".into(),
            id: format!("user_id={user_id}"),
        })?;

        info!(%user_id, "Super-admin grant activated");
        Ok(row.try_into_grant()?)
    }

    async fn revoke(&self, user_id: Uuid) -> OpsResult<()> {
        self.db
            .query(
                "UPDATE super_admin SET is_active = false, updated_at = time::now() \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(%user_id, "Super-admin grant revoked");
        Ok(())
    }

    async fn has_active_grant(&self, user_id: Uuid) -> OpsResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM super_admin \
                 WHERE user_id = $user_id AND is_active = true GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
