//! Super-admin grant model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform-level operator grant. Holders bypass tenant entitlements
/// and can open tools that operators have switched off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperAdminGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Revoked grants are kept with `is_active = false`.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
