//! Machine lifecycle orchestration
//!
//! Create: resolve networks → submit → wait for ACTIVE → patch pod network
//! ports → encode provider ID. Any failure after submission deletes the
//! server again through the regular delete path.
//!
//! Delete: locate → delete → wait until gone → remove the pre-allocated
//! port. Absent servers and ports count as already deleted.

use crate::error::{CloudResultExt, MachineError, Result};
use crate::locator::Locator;
use crate::network::NetworkResolver;
use crate::poller::{WaitPolicy, wait_for_status};
use crate::provider_id::encode;
use crate::provisioner::Provisioner;
use crate::tags::ResolvedTags;
use osmachine_cloud::{Compute, Network, ServerStatus};
use osmachine_config::{MachineProviderConfig, NetworkSelection};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Wait budgets for the two blocking phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTimeouts {
    pub build: WaitPolicy,
    pub delete: WaitPolicy,
}

impl Default for WaitTimeouts {
    fn default() -> Self {
        Self {
            build: WaitPolicy::BUILD,
            delete: WaitPolicy::DELETE,
        }
    }
}

/// Executes machine operations against one region
///
/// Holds no mutable state; calls for different machines may run
/// concurrently. Overlapping calls for the same machine are the caller's
/// responsibility.
pub struct Executor {
    compute: Arc<dyn Compute>,
    network: Arc<dyn Network>,
    config: MachineProviderConfig,
    tags: ResolvedTags,
    timeouts: WaitTimeouts,
}

impl Executor {
    pub fn new(
        compute: Arc<dyn Compute>,
        network: Arc<dyn Network>,
        config: MachineProviderConfig,
    ) -> Self {
        let tags = ResolvedTags::from_config(&config);
        Self {
            compute,
            network,
            config,
            tags,
            timeouts: WaitTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: WaitTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn config(&self) -> &MachineProviderConfig {
        &self.config
    }

    fn resolver(&self) -> NetworkResolver<'_> {
        NetworkResolver::new(self.network.as_ref(), &self.config)
    }

    fn locator(&self) -> Locator<'_> {
        Locator::new(self.compute.as_ref())
    }

    /// True when create pre-allocates a port on the configured subnet
    fn preallocates_port(&self) -> bool {
        matches!(
            self.config.network_selection(),
            NetworkSelection::Subnet { .. }
        )
    }

    /// Create a server and wait until it is ACTIVE with its pod network
    /// ports patched. Returns the encoded provider ID.
    pub async fn create_machine(&self, machine_name: &str, user_data: &[u8]) -> Result<String> {
        let networks = self
            .resolver()
            .server_networks(machine_name)
            .await
            .map_err(|e| e.context("failed to resolve server networks"))?;

        let provisioner = Provisioner::new(self.compute.as_ref(), &self.config);
        let server = match provisioner
            .deploy_server(machine_name, user_data, networks)
            .await
        {
            Ok(server) => server,
            Err(e) => {
                self.release_port(machine_name).await;
                return Err(e.context(format!(
                    "failed to deploy server for machine {:?}",
                    machine_name
                )));
            }
        };

        let provider_id = encode(&self.config.region, &server.id);
        tracing::info!(machine = machine_name, server_id = %server.id, "server submitted");

        if let Err(e) = self.finish_create(&server.id).await {
            return Err(self.rollback(machine_name, &provider_id, &server.id, e).await);
        }

        tracing::info!(machine = machine_name, provider_id = %provider_id, "machine created");
        Ok(provider_id)
    }

    async fn finish_create(&self, server_id: &str) -> Result<()> {
        wait_for_status(
            self.compute.as_ref(),
            server_id,
            &[ServerStatus::Build],
            &[ServerStatus::Active],
            self.timeouts.build,
        )
        .await
        .map_err(|e| {
            e.context(format!(
                "error waiting for server [ID={:?}] to reach target status",
                server_id
            ))
        })?;

        self.resolver()
            .patch_pod_network_ports(server_id)
            .await
            .map_err(|e| e.context(format!("failed to patch server [ID={:?}] ports", server_id)))
    }

    async fn rollback(
        &self,
        machine_name: &str,
        provider_id: &str,
        server_id: &str,
        original: MachineError,
    ) -> MachineError {
        tracing::warn!(
            server_id,
            error = %original,
            "attempting to delete server after unsuccessful create operation"
        );
        if self.tags.get().is_none() {
            tracing::warn!(
                server_id,
                "cluster/role tags are missing, server ownership can not be proven and it is left in place"
            );
        }

        match self.delete_machine(machine_name, Some(provider_id)).await {
            Ok(()) => original,
            Err(rollback) => MachineError::RollbackFailed {
                id: server_id.to_string(),
                original: Box::new(original),
                rollback: Box::new(rollback),
            },
        }
    }

    /// A port pre-allocated for a server that was never submitted
    async fn release_port(&self, machine_name: &str) {
        if !self.preallocates_port() {
            return;
        }
        if let Err(e) = self.delete_port(machine_name).await {
            tracing::warn!(
                machine = machine_name,
                error = %e,
                "failed to release pre-allocated port"
            );
        }
    }

    /// Delete a server by provider ID, or by name when no provider ID is
    /// given. Succeeds when the server is already gone or not owned.
    ///
    /// Only the name lookup requires configured ownership tags.
    pub async fn delete_machine(&self, machine_name: &str, provider_id: Option<&str>) -> Result<()> {
        let locator = self.locator();

        let located = match provider_id.filter(|p| !p.trim().is_empty()) {
            Some(provider_id) => locator.by_provider_id(provider_id, self.tags.get()).await,
            None => {
                let tags = self.tags.require("delete machine")?;
                locator.by_name(machine_name, tags).await
            }
        };
        let server = match located {
            Ok(server) => server,
            Err(e) if e.is_not_found() => {
                tracing::debug!(machine = machine_name, "server already absent");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        tracing::info!(server_id = %server.id, "deleting server");
        match self.compute.delete_server(&server.id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(server_id = %server.id, "server vanished before delete");
            }
            Err(e) => {
                return Err(e)
                    .context_with(|| format!("failed to delete server [ID={:?}]", server.id));
            }
        }

        wait_for_status(
            self.compute.as_ref(),
            &server.id,
            &[],
            &[ServerStatus::Deleted],
            self.timeouts.delete,
        )
        .await
        .map_err(|e| {
            e.context(format!(
                "error while waiting for server [ID={:?}] to be deleted",
                server.id
            ))
        })?;

        if self.preallocates_port() {
            self.delete_port(machine_name).await?;
        }

        Ok(())
    }

    async fn delete_port(&self, machine_name: &str) -> Result<()> {
        let port_id = match self.network.port_id_from_name(machine_name).await {
            Ok(id) => id,
            Err(e) if e.is_not_found() => {
                tracing::debug!(machine = machine_name, "port was not found");
                return Ok(());
            }
            Err(e) => {
                return Err(e)
                    .context_with(|| format!("error deleting port with name {:?}", machine_name));
            }
        };

        tracing::debug!(port_id = %port_id, "deleting port");
        match self.network.delete_port(&port_id).await {
            Ok(()) => {
                tracing::debug!(port_id = %port_id, "deleted port");
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => {
                tracing::error!(port_id = %port_id, error = %e, "failed to delete port");
                Err(e).context_with(|| format!("failed to delete port [ID={:?}]", port_id))
            }
        }
    }

    /// Provider ID of the named server, after checking its pod network ports
    /// are fully patched
    pub async fn get_machine_status(&self, machine_name: &str) -> Result<String> {
        let tags = self.tags.require("get machine status")?;
        let server = self.locator().by_name(machine_name, tags).await?;

        self.resolver().verify_pod_network_ports(&server.id).await?;

        Ok(encode(&self.config.region, &server.id))
    }

    /// Provider ID to name of every server owned by this cluster and role
    pub async fn list_machines(&self) -> Result<BTreeMap<String, String>> {
        let tags = self.tags.require("list machines")?;
        self.locator().list_owned(&self.config.region, tags).await
    }
}
