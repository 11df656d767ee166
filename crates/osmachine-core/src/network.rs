//! Network resolution
//!
//! Decides which networks a new server attaches to, and which of an
//! existing server's ports carry pod traffic.

use crate::error::{CloudResultExt, MachineError, Result};
use osmachine_cloud::{
    AddressPair, CreatePortRequest, FixedIp, Network, Port, PortListFilter, ServerNetwork,
    UpdatePortRequest,
};
use osmachine_config::{MachineProviderConfig, NetworkSelection, NetworkSpec};
use std::collections::HashSet;

pub struct NetworkResolver<'a> {
    network: &'a dyn Network,
    config: &'a MachineProviderConfig,
}

impl<'a> NetworkResolver<'a> {
    pub fn new(network: &'a dyn Network, config: &'a MachineProviderConfig) -> Self {
        Self { network, config }
    }

    /// Network attachments for a new server, in configured order.
    ///
    /// With both a network and a subnet configured, a port named after the
    /// machine is created on the subnet first; this is the only way to pin
    /// the server's address to that subnet.
    pub async fn server_networks(&self, machine_name: &str) -> Result<Vec<ServerNetwork>> {
        tracing::debug!(machine = machine_name, "resolving network setup");

        match self.config.network_selection() {
            NetworkSelection::Subnet {
                network_id,
                subnet_id,
            } => {
                tracing::debug!(
                    network_id,
                    subnet_id,
                    "deploying in existing subnet, pre-allocating port"
                );
                let port = self
                    .allocate_port(machine_name, network_id, subnet_id)
                    .await?;
                tracing::debug!(port_id = %port.id, "port successfully created");
                Ok(vec![ServerNetwork::with_port(network_id, port.id)])
            }
            NetworkSelection::Network { network_id } => {
                tracing::debug!(network_id, "deploying in existing network");
                Ok(vec![ServerNetwork::network(network_id)])
            }
            NetworkSelection::List(networks) => {
                let mut result = Vec::with_capacity(networks.len());
                for spec in networks {
                    result.push(ServerNetwork::network(self.resolve_network_id(spec).await?));
                }
                Ok(result)
            }
        }
    }

    async fn allocate_port(
        &self,
        machine_name: &str,
        network_id: &str,
        subnet_id: &str,
    ) -> Result<Port> {
        self.network
            .get_subnet(subnet_id)
            .await
            .context_with(|| format!("failed to get subnet [ID={:?}]", subnet_id))?;

        let mut security_groups = Vec::with_capacity(self.config.security_groups.len());
        for name in &self.config.security_groups {
            let id = self
                .network
                .security_group_id_from_name(name)
                .await
                .context_with(|| format!("failed to resolve security group {:?}", name))?;
            security_groups.push(id);
        }

        let request = CreatePortRequest {
            name: machine_name.to_string(),
            network_id: network_id.to_string(),
            fixed_ips: vec![FixedIp {
                subnet_id: subnet_id.to_string(),
            }],
            allowed_address_pairs: vec![AddressPair::new(&self.config.pod_network_cidr)],
            security_groups,
        };

        self.network
            .create_port(&request)
            .await
            .context_with(|| format!("failed to create port [Name={:?}]", machine_name))
    }

    async fn resolve_network_id(&self, spec: &NetworkSpec) -> Result<String> {
        if !spec.id.is_empty() {
            return Ok(spec.id.clone());
        }
        self.network
            .network_id_from_name(&spec.name)
            .await
            .context_with(|| format!("failed to resolve network {:?}", spec.name))
    }

    /// Ids of the networks carrying pod traffic
    async fn pod_network_ids(&self) -> Result<HashSet<String>> {
        let mut ids = HashSet::new();
        match self.config.network_selection() {
            NetworkSelection::Subnet { network_id, .. }
            | NetworkSelection::Network { network_id } => {
                ids.insert(network_id.to_string());
            }
            NetworkSelection::List(networks) => {
                for spec in networks.iter().filter(|n| n.pod_network) {
                    ids.insert(self.resolve_network_id(spec).await?);
                }
            }
        }
        Ok(ids)
    }

    /// Ports of `server_id` attached to a pod network
    pub async fn pod_network_ports(&self, server_id: &str) -> Result<Vec<Port>> {
        let network_ids = self.pod_network_ids().await?;

        let ports = self
            .network
            .list_ports(&PortListFilter::by_device(server_id))
            .await
            .context_with(|| format!("failed to get ports of server [ID={:?}]", server_id))?;

        if ports.is_empty() {
            return Err(MachineError::PodNetwork(format!(
                "got an empty port list for server [ID={:?}]",
                server_id
            )));
        }

        let result: Vec<Port> = ports
            .into_iter()
            .filter(|p| network_ids.contains(&p.network_id))
            .collect();

        if result.is_empty() {
            return Err(MachineError::PodNetwork(format!(
                "no port candidates found for pod network of server [ID={:?}]",
                server_id
            )));
        }

        Ok(result)
    }

    /// Allow the pod network CIDR on every pod network port of the server
    pub async fn patch_pod_network_ports(&self, server_id: &str) -> Result<()> {
        let request = UpdatePortRequest {
            allowed_address_pairs: Some(vec![AddressPair::new(&self.config.pod_network_cidr)]),
        };

        for port in self.pod_network_ports(server_id).await? {
            self.network
                .update_port(&port.id, &request)
                .await
                .context_with(|| {
                    format!(
                        "failed to update allowed address pair for port [ID={:?}]",
                        port.id
                    )
                })?;
            tracing::debug!(server_id, port_id = %port.id, "patched port for pod network");
        }
        Ok(())
    }

    /// Check that every pod network port already allows the pod network CIDR
    pub async fn verify_pod_network_ports(&self, server_id: &str) -> Result<()> {
        let cidr = self.config.pod_network_cidr.as_str();

        for port in self.pod_network_ports(server_id).await? {
            if !port.allows(cidr) {
                return Err(MachineError::PodNetwork(format!(
                    "port [ID={:?}] of server [ID={:?}] is not configured for pod network, but it should",
                    port.id, server_id
                )));
            }
        }
        Ok(())
    }
}
