//! OpsDesk Core: Domain models, repository traits, and error types.
//!
//! Every other crate in the workspace depends on this one. It performs no
//! I/O: the storage layer lives in `opsdesk-db` and the access decision
//! logic in `opsdesk-access`.

pub mod error;
pub mod models;
pub mod repository;
