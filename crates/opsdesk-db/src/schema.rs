//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings. `tenant.account_type` is deliberately left unconstrained:
//! the access layer validates it when a tenant is resolved.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (organizations and personal accounts)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD plan ON TABLE tenant TYPE string DEFAULT 'free';
DEFINE FIELD active_tools ON TABLE tenant TYPE array<string> DEFAULT [];
DEFINE FIELD logo_url ON TABLE tenant TYPE option<string>;
DEFINE FIELD timezone ON TABLE tenant TYPE string DEFAULT 'UTC';
DEFINE FIELD account_type ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Tenant membership
-- =======================================================================
DEFINE TABLE tenant_member SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE tenant_member TYPE string;
DEFINE FIELD user_id ON TABLE tenant_member TYPE string;
DEFINE FIELD created_at ON TABLE tenant_member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_member_pair ON TABLE tenant_member \
    COLUMNS tenant_id, user_id UNIQUE;
DEFINE INDEX idx_tenant_member_user ON TABLE tenant_member \
    COLUMNS user_id;

-- =======================================================================
-- Super-admin grants (platform scope)
-- =======================================================================
DEFINE TABLE super_admin SCHEMAFULL;
DEFINE FIELD user_id ON TABLE super_admin TYPE string;
DEFINE FIELD is_active ON TABLE super_admin TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE super_admin TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE super_admin TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_super_admin_user ON TABLE super_admin \
    COLUMNS user_id UNIQUE;

-- =======================================================================
-- Tools (platform scope)
-- =======================================================================
DEFINE TABLE tool SCHEMAFULL;
DEFINE FIELD key ON TABLE tool TYPE string;
DEFINE FIELD name ON TABLE tool TYPE string;
DEFINE FIELD active ON TABLE tool TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE tool TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tool TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tool_key ON TABLE tool COLUMNS key UNIQUE;

-- =======================================================================
-- Tool assignments (tenant scope)
-- =======================================================================
DEFINE TABLE tool_assignment SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE tool_assignment TYPE string;
DEFINE FIELD user_id ON TABLE tool_assignment TYPE string;
DEFINE FIELD tool_key ON TABLE tool_assignment TYPE string;
DEFINE FIELD created_at ON TABLE tool_assignment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tool_assignment_grant ON TABLE tool_assignment \
    COLUMNS tenant_id, user_id, tool_key UNIQUE;
DEFINE INDEX idx_tool_assignment_user ON TABLE tool_assignment \
    COLUMNS user_id;
";

/// Bring the store's schema up to date and return the version now in
/// effect.
///
/// Applied versions are recorded in `_migration`; a migration is recorded
/// only after its DDL succeeds, so a failed step is retried on the next
/// start.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let applied = records.first().map(|m| m.version).unwrap_or(0);

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > applied).collect();
    if pending.is_empty() {
        debug!(version = applied, "Schema up to date");
        return Ok(applied);
    }

    let mut version = applied;
    for migration in pending {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!("v{} '{}': {e}", migration.version, migration.name))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!("recording v{}: {e}", migration.version))
            })?;
        version = migration.version;
    }

    info!(from = applied, to = version, "Schema migrated");
    Ok(version)
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
