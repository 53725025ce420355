//! In-memory directory fakes shared by the access tests.
//!
//! One [`FakeDirectory`] implements every repository trait the access
//! layer consumes. Clones share state, so a test can hand copies to the
//! gate and the context and still inspect lookup counts afterwards.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use opsdesk_core::error::{OpsError, OpsResult};
use opsdesk_core::models::entitlement::{CreateToolAssignment, ToolAssignment};
use opsdesk_core::models::super_admin::SuperAdminGrant;
use opsdesk_core::models::tenant::{CreateTenant, TenantRecord, UpdateTenant};
use opsdesk_core::models::tool::{CreateTool, Tool, ToolKey};
use opsdesk_core::repository::{
    EntitlementRepository, SuperAdminRepository, TenantRepository, ToolRepository,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    SuperAdmin,
    Tool,
    Entitlement,
    Tenant,
}

#[derive(Default)]
struct State {
    super_admins: HashSet<Uuid>,
    tools: HashMap<String, bool>,
    grants: HashSet<(Uuid, String)>,
    tenants: HashMap<Uuid, Vec<TenantRecord>>,
    failing: HashSet<Call>,
    delays: HashMap<Call, Duration>,
    user_delays: HashMap<Uuid, Duration>,
}

#[derive(Default)]
struct Counters {
    super_admin: AtomicUsize,
    tool: AtomicUsize,
    entitlement: AtomicUsize,
    tenant: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct FakeDirectory {
    state: Arc<Mutex<State>>,
    counters: Arc<Counters>,
}

pub fn key(raw: &str) -> ToolKey {
    ToolKey::new(raw).unwrap()
}

pub fn tenant_record(name: &str, account_type: &str) -> TenantRecord {
    TenantRecord {
        id: Uuid::new_v4(),
        name: name.into(),
        plan: "pro".into(),
        active_tools: vec!["crm".into(), "helpdesk".into()],
        logo_url: None,
        timezone: "UTC".into(),
        account_type: account_type.into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(self, raw: &str, active: bool) -> Self {
        self.state.lock().unwrap().tools.insert(raw.into(), active);
        self
    }

    pub fn with_super_admin(self, user_id: Uuid) -> Self {
        self.state.lock().unwrap().super_admins.insert(user_id);
        self
    }

    pub fn with_grant(self, user_id: Uuid, raw: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .grants
            .insert((user_id, raw.into()));
        self
    }

    pub fn with_tenants(self, user_id: Uuid, records: Vec<TenantRecord>) -> Self {
        self.set_tenants(user_id, records);
        self
    }

    pub fn failing(self, call: Call) -> Self {
        self.state.lock().unwrap().failing.insert(call);
        self
    }

    pub fn delayed(self, call: Call, delay: Duration) -> Self {
        self.state.lock().unwrap().delays.insert(call, delay);
        self
    }

    /// Delay tenant lookups for one user only.
    pub fn delayed_tenant_for(self, user_id: Uuid, delay: Duration) -> Self {
        self.state.lock().unwrap().user_delays.insert(user_id, delay);
        self
    }

    pub fn set_tenants(&self, user_id: Uuid, records: Vec<TenantRecord>) {
        self.state.lock().unwrap().tenants.insert(user_id, records);
    }

    pub fn calls(&self, call: Call) -> usize {
        let counter = match call {
            Call::SuperAdmin => &self.counters.super_admin,
            Call::Tool => &self.counters.tool,
            Call::Entitlement => &self.counters.entitlement,
            Call::Tenant => &self.counters.tenant,
        };
        counter.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        [Call::SuperAdmin, Call::Tool, Call::Entitlement, Call::Tenant]
            .into_iter()
            .map(|c| self.calls(c))
            .sum()
    }

    /// Count the call, then sleep and fail as configured.
    async fn enter(&self, call: Call, user_id: Option<Uuid>) -> OpsResult<()> {
        let counter = match call {
            Call::SuperAdmin => &self.counters.super_admin,
            Call::Tool => &self.counters.tool,
            Call::Entitlement => &self.counters.entitlement,
            Call::Tenant => &self.counters.tenant,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        let (delay, fail) = {
            let state = self.state.lock().unwrap();
            let delay = user_id
                .and_then(|id| state.user_delays.get(&id).copied())
                .filter(|_| call == Call::Tenant)
                .or_else(|| state.delays.get(&call).copied());
            (delay, state.failing.contains(&call))
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(OpsError::Database(format!("{call:?} unavailable")));
        }
        Ok(())
    }
}

fn unsupported<T>() -> OpsResult<T> {
    Err(OpsError::Internal("not supported by the fake".into()))
}

impl SuperAdminRepository for FakeDirectory {
    async fn grant(&self, user_id: Uuid) -> OpsResult<SuperAdminGrant> {
        self.state.lock().unwrap().super_admins.insert(user_id);
        Ok(SuperAdminGrant {
            id: Uuid::new_v4(),
            user_id,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    async fn revoke(&self, user_id: Uuid) -> OpsResult<()> {
        self.state.lock().unwrap().super_admins.remove(&user_id);
        Ok(())
    }

    async fn has_active_grant(&self, user_id: Uuid) -> OpsResult<bool> {
        self.enter(Call::SuperAdmin, Some(user_id)).await?;
        Ok(self.state.lock().unwrap().super_admins.contains(&user_id))
    }
}

impl ToolRepository for FakeDirectory {
    async fn create(&self, _input: CreateTool) -> OpsResult<Tool> {
        unsupported()
    }

    async fn get_by_key(&self, key: &ToolKey) -> OpsResult<Option<Tool>> {
        self.enter(Call::Tool, None).await?;
        let active = self.state.lock().unwrap().tools.get(key.as_str()).copied();
        Ok(active.map(|active| Tool {
            id: Uuid::new_v4(),
            key: key.clone(),
            name: key.to_string(),
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }))
    }

    async fn set_active(&self, _key: &ToolKey, _active: bool) -> OpsResult<Tool> {
        unsupported()
    }

    async fn list(&self) -> OpsResult<Vec<Tool>> {
        unsupported()
    }
}

impl EntitlementRepository for FakeDirectory {
    async fn assign(&self, _input: CreateToolAssignment) -> OpsResult<ToolAssignment> {
        unsupported()
    }

    async fn unassign(&self, _user_id: Uuid, _key: &ToolKey) -> OpsResult<()> {
        unsupported()
    }

    async fn list_for_user(&self, _user_id: Uuid) -> OpsResult<Vec<ToolAssignment>> {
        unsupported()
    }

    async fn user_has_tool_access(&self, user_id: Uuid, key: &ToolKey) -> OpsResult<bool> {
        self.enter(Call::Entitlement, Some(user_id)).await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .grants
            .contains(&(user_id, key.as_str().to_string())))
    }
}

impl TenantRepository for FakeDirectory {
    async fn create(&self, _input: CreateTenant) -> OpsResult<TenantRecord> {
        unsupported()
    }

    async fn get_by_id(&self, _id: Uuid) -> OpsResult<TenantRecord> {
        unsupported()
    }

    async fn update(&self, _id: Uuid, _input: UpdateTenant) -> OpsResult<TenantRecord> {
        unsupported()
    }

    async fn add_member(&self, _tenant_id: Uuid, _user_id: Uuid) -> OpsResult<()> {
        unsupported()
    }

    async fn remove_member(&self, _tenant_id: Uuid, _user_id: Uuid) -> OpsResult<()> {
        unsupported()
    }

    async fn find_for_user(&self, user_id: Uuid) -> OpsResult<Vec<TenantRecord>> {
        self.enter(Call::Tenant, Some(user_id)).await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .tenants
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}
