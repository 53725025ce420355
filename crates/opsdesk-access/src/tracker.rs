//! Generation-stamped evaluation slot.
//!
//! A rendered tool keeps one [`AccessTracker`]. Each evaluation is stamped
//! with a generation number and the `(actor, tool, tenant)` inputs it was
//! started with. Only the result whose stamp is still current gets
//! published; results that arrive late for superseded inputs are dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use opsdesk_core::models::access::AccessDecision;
use opsdesk_core::models::actor::{Actor, authenticated};
use opsdesk_core::models::tool::ToolKey;
use opsdesk_core::repository::{
    EntitlementRepository, SuperAdminRepository, TenantRepository, ToolRepository,
};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::context::{SessionProfile, TenantContext};
use crate::gate::AccessGate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationStamp {
    pub generation: u64,
    pub actor_id: Option<Uuid>,
    pub tool_key: ToolKey,
    pub tenant_id: Option<Uuid>,
}

/// The value observers of a tracker see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedDecision {
    /// Stamp of the evaluation that owns the slot. `None` before the
    /// first evaluation.
    pub stamp: Option<EvaluationStamp>,
    pub decision: AccessDecision,
}

pub struct AccessTracker {
    generation: AtomicU64,
    slot: watch::Sender<TrackedDecision>,
}

impl Default for AccessTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessTracker {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: watch::Sender::new(TrackedDecision {
                stamp: None,
                decision: AccessDecision::Pending,
            }),
        }
    }

    pub fn decision(&self) -> AccessDecision {
        self.slot.borrow().decision
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackedDecision> {
        self.slot.subscribe()
    }

    /// Claim the slot for a new evaluation and publish `Pending`.
    pub fn begin(
        &self,
        actor: Option<&Actor>,
        tool_key: &ToolKey,
        tenant_id: Option<Uuid>,
    ) -> EvaluationStamp {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let stamp = EvaluationStamp {
            generation,
            actor_id: authenticated(actor).map(|a| a.id),
            tool_key: tool_key.clone(),
            tenant_id,
        };
        self.slot.send_replace(TrackedDecision {
            stamp: Some(stamp.clone()),
            decision: AccessDecision::Pending,
        });
        stamp
    }

    /// Publish `decision` if `stamp` still owns the slot.
    ///
    /// Returns `false` when a newer evaluation has started since.
    pub fn complete(&self, stamp: &EvaluationStamp, decision: AccessDecision) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.stamp.as_ref() != Some(stamp) {
                return false;
            }
            slot.decision = decision;
            true
        })
    }

    /// Run one stamped evaluation.
    ///
    /// Returns `None` if another evaluation claimed the slot before this
    /// one finished.
    pub async fn evaluate<S, T, E>(
        &self,
        gate: &AccessGate<S, T, E>,
        actor: Option<&Actor>,
        tool_key: &ToolKey,
        profile: Option<&SessionProfile>,
    ) -> Option<AccessDecision>
    where
        S: SuperAdminRepository,
        T: ToolRepository,
        E: EntitlementRepository,
    {
        let stamp = self.begin(actor, tool_key, profile.map(|p| p.tenant.id));
        let decision = gate.evaluate_session(actor, tool_key, profile).await;
        self.finish(&stamp, decision)
    }

    /// Evaluate against whatever `context` currently holds.
    ///
    /// While the tenant is loading the slot stays `Pending` and no lookup
    /// runs. Any context change (actor switch, refresh, sign-out) that
    /// lands while the evaluation is in flight abandons the result and
    /// restarts with the new inputs.
    pub async fn evaluate_in<S, T, E, R, A>(
        &self,
        gate: &AccessGate<S, T, E>,
        context: &TenantContext<R, A>,
        tool_key: &ToolKey,
    ) -> Option<AccessDecision>
    where
        S: SuperAdminRepository,
        T: ToolRepository,
        E: EntitlementRepository,
        R: TenantRepository,
        A: SuperAdminRepository,
    {
        let mut states = context.subscribe();
        loop {
            let state = states.borrow_and_update().clone();
            let actor = context.actor();

            if state.is_loading() {
                let stamp = self.begin(actor.as_ref(), tool_key, None);
                debug!(
                    generation = stamp.generation,
                    %tool_key,
                    "Tenant loading, holding evaluation"
                );
                if states.changed().await.is_err() || !self.owns(&stamp) {
                    return None;
                }
                continue;
            }

            let profile = state.profile();
            let stamp = self.begin(actor.as_ref(), tool_key, profile.map(|p| p.tenant.id));
            let decision = gate.evaluate_session(actor.as_ref(), tool_key, profile).await;

            let changed = states.has_changed().unwrap_or(false);
            if !changed || !self.owns(&stamp) {
                return self.finish(&stamp, decision);
            }
            debug!(
                generation = stamp.generation,
                %tool_key,
                "Session changed during evaluation, restarting"
            );
        }
    }

    fn owns(&self, stamp: &EvaluationStamp) -> bool {
        self.slot.borrow().stamp.as_ref() == Some(stamp)
    }

    fn finish(&self, stamp: &EvaluationStamp, decision: AccessDecision) -> Option<AccessDecision> {
        if self.complete(stamp, decision) {
            Some(decision)
        } else {
            debug!(
                generation = stamp.generation,
                tool_key = %stamp.tool_key,
                "Discarding superseded access decision"
            );
            None
        }
    }
}
