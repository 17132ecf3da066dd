//! Bounded-latency unwrapping.
//!
//! Device requests can block for human-scale time and carry no timeout of
//! their own. [`unwrap_with_timeout`] runs the scan on the blocking pool and
//! stops waiting once the deadline passes. The in-flight device request is
//! abandoned, not interrupted: it keeps the device until it returns.

use std::sync::Arc;
use std::time::Duration;

use hwage_core::{FileKey, Stanza};
use hwage_device::{Ecdh, KeyAuth, KeyHandle};

use crate::config::UnwrapConfig;
use crate::error::{Result, UnwrapError};
use crate::identity::Identity;

/// Unwrap `stanzas` with `device`, giving up after `deadline`.
pub async fn unwrap_with_timeout<D>(
    device: Arc<D>,
    auth: KeyAuth,
    config: UnwrapConfig,
    stanzas: Vec<Stanza>,
    deadline: Duration,
) -> Result<FileKey>
where
    D: Ecdh + Send + Sync + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        Identity::new(KeyHandle::X25519(&*device), auth)?
            .with_config(config)
            .unwrap_stanzas(&stanzas)
    });

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(UnwrapError::Task(e.to_string())),
        Err(_) => {
            tracing::warn!(?deadline, "abandoning unwrap after deadline");
            Err(UnwrapError::TimedOut(deadline))
        }
    }
}
