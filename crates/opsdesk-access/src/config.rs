//! Access configuration.

use serde::Deserialize;

/// Configuration for the access gate and tenant context.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// View offered from a blocking message (default: `/dashboard`).
    pub safe_default_path: String,
    /// Deadline for each remote lookup in milliseconds. A lookup that
    /// misses it counts as failed. `None` waits indefinitely.
    pub lookup_timeout_ms: Option<u64>,
    /// Resolve super-admin status alongside the tenant and reuse it for
    /// every tool check instead of re-querying (default: true).
    pub hoist_super_admin: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            safe_default_path: "/dashboard".into(),
            lookup_timeout_ms: Some(5_000),
            hoist_super_admin: true,
        }
    }
}
