//! Deadline wrapper shared by every remote lookup.

use std::time::Duration;

use opsdesk_core::error::OpsResult;

use crate::error::{AccessError, Lookup};

/// Await `call`, tagging any failure with the lookup kind and key.
pub(crate) async fn run<T>(
    lookup: Lookup,
    key: impl Into<String>,
    timeout_ms: Option<u64>,
    call: impl Future<Output = OpsResult<T>>,
) -> Result<T, AccessError> {
    let result = match timeout_ms {
        Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), call).await {
            Ok(result) => result,
            Err(_) => {
                return Err(AccessError::TimedOut {
                    lookup,
                    key: key.into(),
                    timeout_ms: ms,
                });
            }
        },
        None => call.await,
    };

    result.map_err(|source| AccessError::Lookup {
        lookup,
        key: key.into(),
        source,
    })
}
