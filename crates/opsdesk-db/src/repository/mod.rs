//! SurrealDB repository implementations.

mod entitlement;
mod super_admin;
mod tenant;
mod tool;

pub use entitlement::SurrealEntitlementRepository;
pub use super_admin::SurrealSuperAdminRepository;
pub use tenant::SurrealTenantRepository;
pub use tool::SurrealToolRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidRecord(format!("invalid {what} UUID: {e}")))
}
