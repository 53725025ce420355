//! SurrealDB implementation of [`ToolRepository`].

use chrono::{DateTime, Utc};
use opsdesk_core::error::OpsResult;
use opsdesk_core::models::tool::{CreateTool, Tool, ToolKey};
use opsdesk_core::repository::ToolRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ToolRow {
    key: String,
    name: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ToolRow {
    fn try_into_tool(self, id: Uuid) -> Result<Tool, DbError> {
        let key = ToolKey::new(self.key)
            .map_err(|e| DbError::InvalidRecord(format!("tool {id}: {e}")))?;
        Ok(Tool {
            id,
            key,
            name: self.name,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ToolRowWithId {
    record_id: String,
    key: String,
    name: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ToolRowWithId {
    fn try_into_tool(self) -> Result<Tool, DbError> {
        let id = parse_uuid(&self.record_id, "tool")?;
        ToolRow {
            key: self.key,
            name: self.name,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_tool(id)
    }
}

/// SurrealDB implementation of the Tool repository.
#[derive(Clone)]
pub struct SurrealToolRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealToolRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ToolRepository for SurrealToolRepository<C> {
    async fn create(&self, input: CreateTool) -> OpsResult<Tool> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tool', $id) SET \
                 key = $key, name = $name, active = $active",
            )
            .bind(("id", id_str.clone()))
            .bind(("key", String::from(input.key)))
            .bind(("name", input.name))
            .bind(("active", input.active))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ToolRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tool".into(),
            id: id_str,
        })?;

        Ok(row.try_into_tool(id)?)
    }

    async fn get_by_key(&self, key: &ToolKey) -> OpsResult<Option<Tool>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM tool WHERE key = $key")
            .bind(("key", key.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ToolRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_tool()?)),
            None => Ok(None),
        }
    }

    async fn set_active(&self, key: &ToolKey, active: bool) -> OpsResult<Tool> {
        let existing = self
            .get_by_key(key)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "tool".into(),
                id: format!("key={key}"),
            })?;

        let result = self
            .db
            .query(
                "UPDATE type::record('tool', $id) SET \
                 active = $active, updated_at = time::now()",
            )
            .bind(("id", existing.id.to_string()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ToolRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tool".into(),
            id: existing.id.to_string(),
        })?;

        Ok(row.try_into_tool(existing.id)?)
    }

    async fn list(&self) -> OpsResult<Vec<Tool>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM tool ORDER BY key ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ToolRowWithId> = result.take(0).map_err(DbError::from)?;

        let tools = rows
            .into_iter()
            .map(|row| row.try_into_tool())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tools)
    }
}
