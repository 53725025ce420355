//! OpsDesk Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Opening a migrated store ([`DbManager`], [`DbConfig`]) and the
//!   repository bundle the access layer reads ([`Directory`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Implementations of the `opsdesk-core` repository traits
//!   ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager, Directory};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
