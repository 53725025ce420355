//! Domain models for OpsDesk.
//!
//! These are the core types shared across all crates.

pub mod access;
pub mod actor;
pub mod entitlement;
pub mod super_admin;
pub mod tenant;
pub mod tool;
