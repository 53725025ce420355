//! Tool access gate.
//!
//! Decides whether an actor may view a gated tool. Rules are applied in a
//! fixed order and the first match wins:
//!
//! 1. No authenticated actor: denied as unauthenticated, no lookups.
//! 2. Super-admin status is looked up (or taken from the session profile).
//! 3. The tool's `active` flag is looked up.
//! 4. Super-admins are granted, with an advisory if the tool is inactive.
//! 5. Inactive tools are denied.
//! 6. Personal tenants are granted every active tool.
//! 7. Everyone else needs a per-tool entitlement.
//!
//! Every lookup failure is logged and resolved toward denial.

use opsdesk_core::models::access::{AccessDecision, AccessNotice, DenialReason};
use opsdesk_core::models::actor::{Actor, authenticated};
use opsdesk_core::models::tenant::Tenant;
use opsdesk_core::models::tool::ToolKey;
use opsdesk_core::repository::{EntitlementRepository, SuperAdminRepository, ToolRepository};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::context::SessionProfile;
use crate::error::Lookup;
use crate::lookup;

/// Access gate over the super-admin, tool, and entitlement directories.
///
/// Performs no writes and caches no decisions.
pub struct AccessGate<S: SuperAdminRepository, T: ToolRepository, E: EntitlementRepository> {
    super_admins: S,
    tools: T,
    entitlements: E,
    config: AccessConfig,
}

impl<S, T, E> AccessGate<S, T, E>
where
    S: SuperAdminRepository,
    T: ToolRepository,
    E: EntitlementRepository,
{
    pub fn new(super_admins: S, tools: T, entitlements: E, config: AccessConfig) -> Self {
        Self {
            super_admins,
            tools,
            entitlements,
            config,
        }
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Decide whether `actor` may view `tool_key`.
    ///
    /// Super-admin status is queried on every call. Prefer
    /// [`AccessGate::evaluate_session`] when a [`SessionProfile`] is at hand.
    pub async fn evaluate(
        &self,
        actor: Option<&Actor>,
        tool_key: &ToolKey,
        tenant: Option<&Tenant>,
    ) -> AccessDecision {
        self.decide(actor, tool_key, tenant, None).await
    }

    /// Decide using the tenant and cached super-admin status of a session
    /// profile.
    ///
    /// The cached flag is only trusted when `hoist_super_admin` is enabled
    /// and the profile's own lookup succeeded; otherwise it is re-queried.
    pub async fn evaluate_session(
        &self,
        actor: Option<&Actor>,
        tool_key: &ToolKey,
        profile: Option<&SessionProfile>,
    ) -> AccessDecision {
        let cached = if self.config.hoist_super_admin {
            profile.and_then(|p| p.super_admin)
        } else {
            None
        };
        self.decide(actor, tool_key, profile.map(|p| &p.tenant), cached)
            .await
    }

    /// Gate for operator-only areas. Only an active super-admin grant
    /// passes.
    pub async fn require_super_admin(&self, actor: Option<&Actor>) -> AccessDecision {
        let Some(actor) = authenticated(actor) else {
            return AccessDecision::Denied(DenialReason::Unauthenticated);
        };

        if self.is_super_admin(actor.id).await {
            AccessDecision::GRANTED
        } else {
            AccessDecision::Denied(DenialReason::NotEntitled)
        }
    }

    async fn decide(
        &self,
        actor: Option<&Actor>,
        tool_key: &ToolKey,
        tenant: Option<&Tenant>,
        cached_super_admin: Option<bool>,
    ) -> AccessDecision {
        let Some(actor) = authenticated(actor) else {
            return AccessDecision::Denied(DenialReason::Unauthenticated);
        };

        let super_admin = match cached_super_admin {
            Some(flag) => flag,
            None => self.is_super_admin(actor.id).await,
        };
        let tool_active = self.is_tool_active(tool_key).await;

        if super_admin {
            return AccessDecision::Granted {
                notice: (!tool_active).then_some(AccessNotice::ToolInactive),
            };
        }

        if !tool_active {
            return AccessDecision::Denied(DenialReason::ToolInactive);
        }

        if tenant.is_some_and(Tenant::is_personal) {
            return AccessDecision::GRANTED;
        }

        if self.is_entitled(actor.id, tool_key).await {
            AccessDecision::GRANTED
        } else {
            debug!(user_id = %actor.id, %tool_key, "No entitlement for tool");
            AccessDecision::Denied(DenialReason::NotEntitled)
        }
    }

    async fn is_super_admin(&self, user_id: Uuid) -> bool {
        let call = self.super_admins.has_active_grant(user_id);
        match lookup::run(
            Lookup::SuperAdmin,
            user_id.to_string(),
            self.config.lookup_timeout_ms,
            call,
        )
        .await
        {
            Ok(flag) => flag,
            Err(err) => {
                warn!(error = %err, %user_id, "Treating actor as non-super-admin");
                false
            }
        }
    }

    async fn is_tool_active(&self, tool_key: &ToolKey) -> bool {
        let call = self.tools.get_by_key(tool_key);
        match lookup::run(
            Lookup::ToolActive,
            tool_key.as_str(),
            self.config.lookup_timeout_ms,
            call,
        )
        .await
        {
            Ok(Some(tool)) => tool.active,
            Ok(None) => {
                warn!(%tool_key, "Unknown tool key, treating tool as inactive");
                false
            }
            Err(err) => {
                warn!(error = %err, %tool_key, "Treating tool as inactive");
                false
            }
        }
    }

    async fn is_entitled(&self, user_id: Uuid, tool_key: &ToolKey) -> bool {
        let call = self.entitlements.user_has_tool_access(user_id, tool_key);
        match lookup::run(
            Lookup::Entitlement,
            format!("{user_id}/{tool_key}"),
            self.config.lookup_timeout_ms,
            call,
        )
        .await
        {
            Ok(granted) => granted,
            Err(err) => {
                warn!(error = %err, %user_id, %tool_key, "Treating actor as not entitled");
                false
            }
        }
    }
}
