//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The access layer is generic over
//! these traits so it never depends on a concrete storage engine.

use uuid::Uuid;

use crate::error::OpsResult;
use crate::models::{
    entitlement::{CreateToolAssignment, ToolAssignment},
    super_admin::SuperAdminGrant,
    tenant::{CreateTenant, TenantRecord, UpdateTenant},
    tool::{CreateTool, Tool, ToolKey},
};

// ---------------------------------------------------------------------------
// Tenants
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = OpsResult<TenantRecord>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = OpsResult<TenantRecord>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = OpsResult<TenantRecord>> + Send;

    /// Attach a user to a tenant.
    fn add_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = OpsResult<()>> + Send;

    fn remove_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = OpsResult<()>> + Send;

    /// Every tenant row the user belongs to, unvalidated.
    ///
    /// A correctly provisioned user has exactly one; callers decide what
    /// to do with zero or several.
    fn find_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = OpsResult<Vec<TenantRecord>>> + Send;
}

// ---------------------------------------------------------------------------
// Platform operators
// ---------------------------------------------------------------------------

pub trait SuperAdminRepository: Send + Sync {
    /// Grant (or re-activate) super-admin status.
    fn grant(&self, user_id: Uuid) -> impl Future<Output = OpsResult<SuperAdminGrant>> + Send;
    /// Deactivate the user's grant. Revoking a missing grant is a no-op.
    fn revoke(&self, user_id: Uuid) -> impl Future<Output = OpsResult<()>> + Send;
    fn has_active_grant(&self, user_id: Uuid) -> impl Future<Output = OpsResult<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Tools & entitlements
// ---------------------------------------------------------------------------

pub trait ToolRepository: Send + Sync {
    fn create(&self, input: CreateTool) -> impl Future<Output = OpsResult<Tool>> + Send;
    /// `None` when no tool is registered under `key`.
    fn get_by_key(&self, key: &ToolKey) -> impl Future<Output = OpsResult<Option<Tool>>> + Send;
    fn set_active(
        &self,
        key: &ToolKey,
        active: bool,
    ) -> impl Future<Output = OpsResult<Tool>> + Send;
    fn list(&self) -> impl Future<Output = OpsResult<Vec<Tool>>> + Send;
}

pub trait EntitlementRepository: Send + Sync {
    fn assign(
        &self,
        input: CreateToolAssignment,
    ) -> impl Future<Output = OpsResult<ToolAssignment>> + Send;
    fn unassign(&self, user_id: Uuid, key: &ToolKey) -> impl Future<Output = OpsResult<()>> + Send;
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = OpsResult<Vec<ToolAssignment>>> + Send;

    /// Whether the user has been assigned the tool.
    fn user_has_tool_access(
        &self,
        user_id: Uuid,
        key: &ToolKey,
    ) -> impl Future<Output = OpsResult<bool>> + Send;
}
