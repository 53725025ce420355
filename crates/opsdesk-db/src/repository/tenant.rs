//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use opsdesk_core::error::OpsResult;
use opsdesk_core::models::tenant::{CreateTenant, TenantRecord, UpdateTenant};
use opsdesk_core::repository::TenantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    plan: String,
    active_tools: Vec<String>,
    logo_url: Option<String>,
    timezone: String,
    account_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_record(self, id: Uuid) -> TenantRecord {
        TenantRecord {
            id,
            name: self.name,
            plan: self.plan,
            active_tools: self.active_tools,
            logo_url: self.logo_url,
            timezone: self.timezone,
            account_type: self.account_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    plan: String,
    active_tools: Vec<String>,
    logo_url: Option<String>,
    timezone: String,
    account_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_record(self) -> Result<TenantRecord, DbError> {
        let id = parse_uuid(&self.record_id, "tenant")?;
        Ok(TenantRow {
            name: self.name,
            plan: self.plan,
            active_tools: self.active_tools,
            logo_url: self.logo_url,
            timezone: self.timezone,
            account_type: self.account_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_record(id))
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> OpsResult<TenantRecord> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let active_tools: Vec<String> = input.active_tools.into_iter().map(String::from).collect();

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 name = $name, plan = $plan, active_tools = $active_tools, \
                 logo_url = $logo_url, timezone = $timezone, \
                 account_type = $account_type",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("plan", input.plan))
            .bind(("active_tools", active_tools))
            .bind(("logo_url", input.logo_url))
            .bind(("timezone", input.timezone))
            .bind(("account_type", input.account_kind.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id))
    }

    async fn get_by_id(&self, id: Uuid) -> OpsResult<TenantRecord> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id))
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> OpsResult<TenantRecord> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.plan.is_some() {
            sets.push("plan = $plan");
        }
        if input.active_tools.is_some() {
            sets.push("active_tools = $active_tools");
        }
        match &input.logo_url {
            Some(Some(_)) => sets.push("logo_url = $logo_url"),
            Some(None) => sets.push("logo_url = NONE"),
            None => {}
        }
        if input.timezone.is_some() {
            sets.push("timezone = $timezone");
        }
        if input.account_kind.is_some() {
            sets.push("account_type = $account_type");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tenant', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(plan) = input.plan {
            builder = builder.bind(("plan", plan));
        }
        if let Some(tools) = input.active_tools {
            let tools: Vec<String> = tools.into_iter().map(String::from).collect();
            builder = builder.bind(("active_tools", tools));
        }
        if let Some(Some(logo_url)) = input.logo_url {
            builder = builder.bind(("logo_url", logo_url));
        }
        if let Some(timezone) = input.timezone {
            builder = builder.bind(("timezone", timezone));
        }
        if let Some(kind) = input.account_kind {
            builder = builder.bind(("account_type", kind.as_str().to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id))
    }

    async fn add_member(&self, tenant_id: Uuid, user_id: Uuid) -> OpsResult<()> {
        // Fail with NotFound rather than creating a dangling membership.
        self.get_by_id(tenant_id).await?;

        self.db
            .query("CREATE tenant_member SET tenant_id = $tenant_id, user_id = $user_id")
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn remove_member(&self, tenant_id: Uuid, user_id: Uuid) -> OpsResult<()> {
        self.db
            .query("DELETE tenant_member WHERE tenant_id = $tenant_id AND user_id = $user_id")
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn find_for_user(&self, user_id: Uuid) -> OpsResult<Vec<TenantRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE meta::id(id) IN \
                 (SELECT VALUE tenant_id FROM tenant_member WHERE user_id = $user_id) \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;

        let records = rows
            .into_iter()
            .map(|row| row.try_into_record())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(records)
    }
}
