//! Tenant context.
//!
//! Resolves and caches the single tenant the current actor belongs to,
//! together with the actor's super-admin status. State moves through
//! `Uninitialized -> Loading -> {Resolved, Absent}` and returns to
//! `Loading` on every actor change or refresh. Signing out goes straight
//! to `Absent` without a lookup.
//!
//! There is one writer (the resolve/refresh routine) and any number of
//! readers. Readers observe state through a `tokio::sync::watch` channel
//! and must tolerate it changing between reads.

use std::sync::Arc;

use opsdesk_core::models::actor::{Actor, authenticated};
use opsdesk_core::models::tenant::{AccountKind, Tenant};
use opsdesk_core::repository::{SuperAdminRepository, TenantRepository};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::error::{AccessError, Lookup};
use crate::lookup;

/// What the context caches for an authenticated actor.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProfile {
    pub tenant: Tenant,
    /// `None` when the lookup failed or hoisting is disabled; the gate
    /// then queries it itself.
    pub super_admin: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TenantState {
    Uninitialized,
    Loading,
    Resolved(Arc<SessionProfile>),
    Absent,
}

impl TenantState {
    pub fn profile(&self) -> Option<&SessionProfile> {
        match self {
            TenantState::Resolved(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        self.profile().map(|p| &p.tenant)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TenantState::Loading)
    }
}

pub struct TenantContext<R: TenantRepository, S: SuperAdminRepository> {
    tenants: R,
    super_admins: S,
    config: AccessConfig,
    actor: watch::Sender<Option<Actor>>,
    state: watch::Sender<TenantState>,
}

impl<R: TenantRepository, S: SuperAdminRepository> TenantContext<R, S> {
    pub fn new(tenants: R, super_admins: S, config: AccessConfig) -> Self {
        Self {
            tenants,
            super_admins,
            config,
            actor: watch::Sender::new(None),
            state: watch::Sender::new(TenantState::Uninitialized),
        }
    }

    /// Resolve the tenant for `actor` without touching cached state.
    ///
    /// Returns `None` for an absent actor (without a lookup), an actor
    /// with no tenant, more than one tenant, or any lookup failure.
    pub async fn resolve(&self, actor: Option<&Actor>) -> Option<Tenant> {
        let actor = authenticated(actor)?;
        match self.fetch_tenant(actor.id).await {
            Ok(tenant) => tenant,
            Err(err) => {
                warn!(error = %err, user_id = %actor.id, "Tenant resolution failed");
                None
            }
        }
    }

    /// Switch to a new actor (sign-in, sign-out, or session change) and
    /// resolve its tenant.
    pub async fn set_actor(&self, actor: Option<Actor>) {
        let actor = actor.filter(Actor::is_authenticated);
        self.actor.send_replace(actor.clone());
        self.load(actor).await;
    }

    /// Re-resolve for the current actor and replace the cached state
    /// wholesale.
    ///
    /// Safe to run alongside a resolution started by [`Self::set_actor`]:
    /// the last write for the current actor wins.
    pub async fn refresh(&self) {
        let actor = self.actor();
        self.load(actor).await;
    }

    pub fn actor(&self) -> Option<Actor> {
        self.actor.borrow().clone()
    }

    pub fn state(&self) -> TenantState {
        self.state.borrow().clone()
    }

    pub fn profile(&self) -> Option<Arc<SessionProfile>> {
        match &*self.state.borrow() {
            TenantState::Resolved(profile) => Some(Arc::clone(profile)),
            _ => None,
        }
    }

    pub fn tenant(&self) -> Option<Tenant> {
        self.state.borrow().tenant().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<TenantState> {
        self.state.subscribe()
    }

    async fn load(&self, actor: Option<Actor>) {
        let Some(actor) = actor else {
            self.state.send_replace(TenantState::Absent);
            return;
        };

        self.state.send_replace(TenantState::Loading);

        let next = match self.load_profile(&actor).await {
            Some(profile) => TenantState::Resolved(Arc::new(profile)),
            None => TenantState::Absent,
        };

        // A newer actor may have been set while this lookup was in flight.
        let current = self.actor.borrow().as_ref().map(|a| a.id);
        if current != Some(actor.id) {
            debug!(user_id = %actor.id, "Discarding tenant resolution for superseded actor");
            return;
        }

        if let TenantState::Resolved(profile) = &next {
            info!(
                user_id = %actor.id,
                tenant_id = %profile.tenant.id,
                account_kind = %profile.tenant.account_kind,
                "Tenant resolved"
            );
        }
        self.state.send_replace(next);
    }

    async fn load_profile(&self, actor: &Actor) -> Option<SessionProfile> {
        let tenant = self.resolve(Some(actor)).await?;

        let super_admin = if self.config.hoist_super_admin {
            let call = self.super_admins.has_active_grant(actor.id);
            match lookup::run(
                Lookup::SuperAdmin,
                actor.id.to_string(),
                self.config.lookup_timeout_ms,
                call,
            )
            .await
            {
                Ok(flag) => Some(flag),
                Err(err) => {
                    warn!(error = %err, "Super-admin status not cached; gate will re-query");
                    None
                }
            }
        } else {
            None
        };

        Some(SessionProfile {
            tenant,
            super_admin,
        })
    }

    async fn fetch_tenant(&self, user_id: Uuid) -> Result<Option<Tenant>, AccessError> {
        let call = self.tenants.find_for_user(user_id);
        let mut rows = lookup::run(
            Lookup::Tenant,
            user_id.to_string(),
            self.config.lookup_timeout_ms,
            call,
        )
        .await?;

        if rows.len() > 1 {
            return Err(AccessError::AmbiguousTenant {
                user_id,
                rows: rows.len(),
            });
        }

        let Some(record) = rows.pop() else {
            debug!(%user_id, "Actor has no tenant");
            return Ok(None);
        };

        let account_kind = match record.account_type.parse::<AccountKind>() {
            Ok(kind) => kind,
            Err(_) => {
                let err = AccessError::UnknownAccountKind {
                    tenant_id: record.id,
                    raw: record.account_type.clone(),
                };
                warn!(error = %err, "Treating tenant as an organization");
                AccountKind::Organization
            }
        };

        Ok(Some(record.into_tenant(account_kind)))
    }
}
