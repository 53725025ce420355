//! Opening the OpsDesk store and handing out its repositories.

use std::fmt;

use serde::Deserialize;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealEntitlementRepository, SurrealSuperAdminRepository, SurrealTenantRepository,
    SurrealToolRepository,
};
use crate::schema::run_migrations;

/// Where the store lives and how to sign in to it.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// WebSocket address, `host:port`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "opsdesk".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

// Config is logged at startup; keep the password out of it.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Every repository the access layer reads, sharing one client.
#[derive(Clone)]
pub struct Directory<C: Connection> {
    pub tenants: SurrealTenantRepository<C>,
    pub super_admins: SurrealSuperAdminRepository<C>,
    pub tools: SurrealToolRepository<C>,
    pub entitlements: SurrealEntitlementRepository<C>,
}

impl<C: Connection> Directory<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            tenants: SurrealTenantRepository::new(db.clone()),
            super_admins: SurrealSuperAdminRepository::new(db.clone()),
            tools: SurrealToolRepository::new(db.clone()),
            entitlements: SurrealEntitlementRepository::new(db),
        }
    }
}

/// A migrated store reached over WebSocket.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Sign in as root, select the namespace and database, and bring the
    /// schema up to date. The store is ready for reads once this returns.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Opening OpsDesk store"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        let version = run_migrations(&db).await?;
        info!(schema_version = version, "OpsDesk store ready");

        Ok(Self { db })
    }

    pub fn directory(&self) -> Directory<Client> {
        Directory::new(self.db.clone())
    }
}
