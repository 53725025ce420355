//! OpsDesk Server: wires the access gate and tenant context to
//! SurrealDB and runs the configured access probe.

mod config;

use opsdesk_access::{AccessGate, AccessTracker, TenantContext};
use opsdesk_core::models::access::AccessView;
use opsdesk_core::models::actor::Actor;
use opsdesk_core::models::tool::ToolKey;
use opsdesk_db::repository::{
    SurrealEntitlementRepository, SurrealSuperAdminRepository, SurrealTenantRepository,
    SurrealToolRepository,
};
use opsdesk_db::{DbError, DbManager};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ProbeConfig, ServerConfig};

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("invalid probe: {0}")]
    Probe(#[from] opsdesk_core::error::OpsError),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("opsdesk=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!("Starting OpsDesk server...");

    let config = ServerConfig::load(ServerConfig::path_from_env().as_deref())?;
    info!(database = ?config.database, access = ?config.access, "Configuration loaded");
    let manager = DbManager::open(&config.database).await?;
    let directory = manager.directory();

    let gate = AccessGate::new(
        directory.super_admins.clone(),
        directory.tools,
        directory.entitlements,
        config.access.clone(),
    );
    let context = TenantContext::new(
        directory.tenants,
        directory.super_admins,
        config.access.clone(),
    );

    match &config.probe {
        Some(probe) => run_probe(&gate, &context, probe).await?,
        None => info!("No probe configured"),
    }

    info!("OpsDesk server stopped.");
    Ok(())
}

async fn run_probe<C: surrealdb::Connection>(
    gate: &AccessGate<
        SurrealSuperAdminRepository<C>,
        SurrealToolRepository<C>,
        SurrealEntitlementRepository<C>,
    >,
    context: &TenantContext<SurrealTenantRepository<C>, SurrealSuperAdminRepository<C>>,
    probe: &ProbeConfig,
) -> Result<(), ServerError> {
    let tool_key = ToolKey::new(probe.tool_key.as_str())?;

    context.set_actor(Some(Actor::new(probe.actor_id))).await;
    let tenant = context.tenant();
    info!(
        actor_id = %probe.actor_id,
        tenant_id = ?tenant.as_ref().map(|t| t.id),
        "Probe session resolved"
    );

    let tracker = AccessTracker::new();
    let Some(decision) = tracker.evaluate_in(gate, context, &tool_key).await else {
        warn!(%tool_key, "Probe evaluation was superseded");
        return Ok(());
    };

    match decision.view(&gate.config().safe_default_path) {
        AccessView::Loading => info!(%tool_key, "Access pending"),
        AccessView::Content { advisory } => info!(
            %tool_key,
            advisory = advisory.map(|a| a.message),
            "Access granted"
        ),
        AccessView::Blocked(view) => info!(
            %tool_key,
            title = view.title,
            message = view.message,
            back_path = %view.back_path,
            actions = ?view.actions,
            "Access blocked"
        ),
    }

    Ok(())
}
