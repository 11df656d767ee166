//! Server status polling
//!
//! Blocks the calling task until a server reaches one of the target
//! statuses. Used for both the build wait and the delete drain.

use crate::error::{CloudResultExt, MachineError, Result};
use osmachine_cloud::{Compute, ServerStatus};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Polling period and hard deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitPolicy {
    /// Wait for a freshly submitted server to become ACTIVE (10 minutes)
    pub const BUILD: WaitPolicy = WaitPolicy {
        interval: Duration::from_secs(1),
        timeout: Duration::from_secs(600),
    };

    /// Wait for a deleted server to disappear (5 minutes)
    pub const DELETE: WaitPolicy = WaitPolicy {
        interval: Duration::from_secs(1),
        timeout: Duration::from_secs(300),
    };
}

/// Wait until the server with `server_id` reaches one of `target`.
///
/// Fails when:
/// - the status leaves `pending` (an empty `pending` accepts any status),
///   with the provider fault attached for ERROR
/// - a query fails, unless the server is gone and `target` contains
///   [`ServerStatus::Deleted`]
/// - `policy.timeout` elapses
///
/// The first query is issued after one interval.
pub async fn wait_for_status(
    compute: &dyn Compute,
    server_id: &str,
    pending: &[ServerStatus],
    target: &[ServerStatus],
    policy: WaitPolicy,
) -> Result<()> {
    let deadline = Instant::now() + policy.timeout;

    loop {
        sleep(policy.interval).await;

        if reached(compute, server_id, pending, target).await? {
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(MachineError::Timeout {
                id: server_id.to_string(),
                target: format_statuses(target),
                after: policy.timeout,
            });
        }
    }
}

async fn reached(
    compute: &dyn Compute,
    server_id: &str,
    pending: &[ServerStatus],
    target: &[ServerStatus],
) -> Result<bool> {
    let current = match compute.get_server(server_id).await {
        Ok(server) => server,
        Err(e) if e.is_not_found() && target.contains(&ServerStatus::Deleted) => {
            return Ok(true);
        }
        Err(e) => {
            return Err(e).context_with(|| format!("failed to get server [ID={:?}]", server_id));
        }
    };

    tracing::debug!(
        server_id,
        status = %current.status,
        "waiting for server to reach {}",
        format_statuses(target)
    );

    if target.contains(&current.status) {
        return Ok(true);
    }

    if pending.is_empty() || pending.contains(&current.status) {
        return Ok(false);
    }

    if current.status == ServerStatus::Error {
        return Err(MachineError::Rejected {
            id: server_id.to_string(),
            status: current.status,
            fault: current.fault,
        });
    }

    Err(MachineError::UnexpectedStatus {
        id: server_id.to_string(),
        status: current.status,
    })
}

fn format_statuses(statuses: &[ServerStatus]) -> String {
    let names: Vec<&str> = statuses.iter().map(ServerStatus::as_str).collect();
    format!("[{}]", names.join(", "))
}
