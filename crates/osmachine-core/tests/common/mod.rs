//! In-memory compute and network capabilities for lifecycle tests.
//!
//! Every call is recorded in `calls` as `"<operation>:<argument>"`.

#![allow(dead_code)]

use async_trait::async_trait;
use osmachine_cloud::{
    CloudError, Compute, CreatePortRequest, CreateServerRequest, Fault, Network, Port,
    PortListFilter, Result, Server, ServerListFilter, ServerStatus, Subnet, UpdatePortRequest,
};
use osmachine_config::{MachineProviderConfig, NetworkSpec};
use osmachine_core::{Executor, WaitPolicy, WaitTimeouts};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const CLUSTER_TAG: &str = "kubernetes.io-cluster-shoot--dev";
pub const ROLE_TAG: &str = "kubernetes.io-role-node";
pub const POD_CIDR: &str = "100.96.0.0/11";

/// One scripted answer for `get_server`
#[derive(Debug, Clone)]
pub enum Scripted {
    Status(ServerStatus),
    Faulted(Fault),
    NotFound,
}

#[derive(Default)]
pub struct State {
    pub servers: BTreeMap<String, Server>,
    pub script: VecDeque<Scripted>,
    pub ports: Vec<Port>,
    pub subnets: BTreeSet<String>,
    pub security_groups: BTreeMap<String, String>,
    pub networks: BTreeMap<String, String>,
    pub images: BTreeMap<String, String>,
    pub flavors: BTreeMap<String, String>,
    pub calls: Vec<String>,
    pub server_requests: Vec<CreateServerRequest>,
    pub port_requests: Vec<CreatePortRequest>,
    pub port_updates: Vec<(String, UpdatePortRequest)>,
    pub fail_delete_server: bool,
    /// Ports the fake provider attaches on boot for plain network attachments
    pub attach_ports: bool,
    next_id: u32,
}

#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<State>,
}

impl FakeCloud {
    pub fn new() -> Arc<Self> {
        let cloud = FakeCloud::default();
        {
            let mut state = cloud.state();
            state.images.insert("ubuntu-22.04".into(), "img-ubuntu".into());
            state.flavors.insert("m1.large".into(), "flv-large".into());
            state.attach_ports = true;
        }
        Arc::new(cloud)
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn script(&self, answers: impl IntoIterator<Item = Scripted>) {
        self.state().script.extend(answers);
    }

    /// Insert a server owned by the test cluster
    pub fn add_owned_server(&self, id: &str, name: &str, status: ServerStatus) {
        self.add_server(id, name, status, &[CLUSTER_TAG, ROLE_TAG]);
    }

    pub fn add_server(&self, id: &str, name: &str, status: ServerStatus, tags: &[&str]) {
        let server = Server {
            id: id.into(),
            name: name.into(),
            status,
            metadata: tags.iter().map(|t| (t.to_string(), "1".to_string())).collect(),
            fault: None,
        };
        self.state().servers.insert(id.into(), server);
    }

    pub fn add_port(&self, id: &str, network_id: &str, device_id: &str, pairs: &[&str]) {
        self.state().ports.push(Port {
            id: id.into(),
            name: String::new(),
            network_id: network_id.into(),
            device_id: device_id.into(),
            allowed_address_pairs: pairs
                .iter()
                .map(|p| osmachine_cloud::AddressPair::new(*p))
                .collect(),
            security_groups: Vec::new(),
        });
    }

    fn submit(&self, op: &str, request: &CreateServerRequest) -> Server {
        let mut state = self.state();
        state.calls.push(format!("{}:{}", op, request.name));
        state.server_requests.push(request.clone());
        state.next_id += 1;
        let id = format!("srv-{}", state.next_id);

        for (i, attachment) in request.networks.iter().enumerate() {
            match &attachment.port {
                Some(port_id) => {
                    if let Some(port) = state.ports.iter_mut().find(|p| &p.id == port_id) {
                        port.device_id = id.clone();
                    }
                }
                None if state.attach_ports => {
                    let port = Port {
                        id: format!("{}-port-{}", id, i),
                        network_id: attachment.uuid.clone(),
                        device_id: id.clone(),
                        ..Default::default()
                    };
                    state.ports.push(port);
                }
                None => {}
            }
        }

        let server = Server {
            id: id.clone(),
            name: request.name.clone(),
            status: ServerStatus::Build,
            metadata: request.metadata.clone(),
            fault: None,
        };
        state.servers.insert(id, server.clone());
        server
    }
}

fn by_name(map: &BTreeMap<String, String>, kind: &str, name: &str) -> Result<String> {
    map.get(name)
        .cloned()
        .ok_or_else(|| CloudError::NotFound(format!("{} {}", kind, name)))
}

#[async_trait]
impl Compute for FakeCloud {
    async fn create_server(&self, request: &CreateServerRequest) -> Result<Server> {
        Ok(self.submit("create_server", request))
    }

    async fn boot_from_volume(&self, request: &CreateServerRequest) -> Result<Server> {
        Ok(self.submit("boot_from_volume", request))
    }

    async fn get_server(&self, id: &str) -> Result<Server> {
        let mut state = self.state();
        state.calls.push(format!("get_server:{}", id));

        let current = state.servers.get(id).cloned();
        match state.script.pop_front() {
            Some(Scripted::NotFound) => Err(CloudError::NotFound(format!("server {}", id))),
            Some(Scripted::Status(status)) => {
                let mut server = current.unwrap_or_else(|| blank_server(id));
                server.status = status;
                Ok(server)
            }
            Some(Scripted::Faulted(fault)) => {
                let mut server = current.unwrap_or_else(|| blank_server(id));
                server.status = ServerStatus::Error;
                server.fault = Some(fault);
                Ok(server)
            }
            None => current.ok_or_else(|| CloudError::NotFound(format!("server {}", id))),
        }
    }

    async fn list_servers(&self, filter: &ServerListFilter) -> Result<Vec<Server>> {
        let mut state = self.state();
        state
            .calls
            .push(format!("list_servers:{}", filter.name.clone().unwrap_or_default()));
        // Name filters are substring matches, as on the real service
        Ok(state
            .servers
            .values()
            .filter(|s| filter.name.as_ref().is_none_or(|n| s.name.contains(n.as_str())))
            .cloned()
            .collect())
    }

    async fn delete_server(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(format!("delete_server:{}", id));
        if state.fail_delete_server {
            return Err(CloudError::Api("delete rejected: server is locked".into()));
        }
        state.servers.remove(id);
        Ok(())
    }

    async fn image_id_from_name(&self, name: &str) -> Result<String> {
        let mut state = self.state();
        state.calls.push(format!("image_id_from_name:{}", name));
        by_name(&state.images, "image", name)
    }

    async fn flavor_id_from_name(&self, name: &str) -> Result<String> {
        let mut state = self.state();
        state.calls.push(format!("flavor_id_from_name:{}", name));
        by_name(&state.flavors, "flavor", name)
    }
}

#[async_trait]
impl Network for FakeCloud {
    async fn get_subnet(&self, id: &str) -> Result<Subnet> {
        let mut state = self.state();
        state.calls.push(format!("get_subnet:{}", id));
        if state.subnets.contains(id) {
            Ok(Subnet {
                id: id.into(),
                name: String::new(),
                network_id: String::new(),
                cidr: "10.250.0.0/16".into(),
            })
        } else {
            Err(CloudError::NotFound(format!("subnet {}", id)))
        }
    }

    async fn create_port(&self, request: &CreatePortRequest) -> Result<Port> {
        let mut state = self.state();
        state.calls.push(format!("create_port:{}", request.name));
        state.port_requests.push(request.clone());
        let port = Port {
            id: format!("port-{}", request.name),
            name: request.name.clone(),
            network_id: request.network_id.clone(),
            device_id: String::new(),
            allowed_address_pairs: request.allowed_address_pairs.clone(),
            security_groups: request.security_groups.clone(),
        };
        state.ports.push(port.clone());
        Ok(port)
    }

    async fn update_port(&self, id: &str, request: &UpdatePortRequest) -> Result<Port> {
        let mut state = self.state();
        state.calls.push(format!("update_port:{}", id));
        state.port_updates.push((id.to_string(), request.clone()));
        let port = state
            .ports
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CloudError::NotFound(format!("port {}", id)))?;
        if let Some(pairs) = &request.allowed_address_pairs {
            port.allowed_address_pairs = pairs.clone();
        }
        Ok(port.clone())
    }

    async fn delete_port(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push(format!("delete_port:{}", id));
        let before = state.ports.len();
        state.ports.retain(|p| p.id != id);
        if state.ports.len() == before {
            return Err(CloudError::NotFound(format!("port {}", id)));
        }
        Ok(())
    }

    async fn list_ports(&self, filter: &PortListFilter) -> Result<Vec<Port>> {
        let mut state = self.state();
        state.calls.push(format!(
            "list_ports:{}",
            filter.device_id.clone().unwrap_or_default()
        ));
        Ok(state
            .ports
            .iter()
            .filter(|p| filter.device_id.as_ref().is_none_or(|d| &p.device_id == d))
            .filter(|p| filter.name.as_ref().is_none_or(|n| &p.name == n))
            .cloned()
            .collect())
    }

    async fn network_id_from_name(&self, name: &str) -> Result<String> {
        let mut state = self.state();
        state.calls.push(format!("network_id_from_name:{}", name));
        by_name(&state.networks, "network", name)
    }

    async fn port_id_from_name(&self, name: &str) -> Result<String> {
        let mut state = self.state();
        state.calls.push(format!("port_id_from_name:{}", name));
        let ids: Vec<String> = state
            .ports
            .iter()
            .filter(|p| p.name == name)
            .map(|p| p.id.clone())
            .collect();
        match ids.len() {
            0 => Err(CloudError::NotFound(format!("port {}", name))),
            1 => Ok(ids[0].clone()),
            _ => Err(CloudError::MultipleFound(format!("port {}", name))),
        }
    }

    async fn security_group_id_from_name(&self, name: &str) -> Result<String> {
        let mut state = self.state();
        state.calls.push(format!("security_group_id_from_name:{}", name));
        by_name(&state.security_groups, "security group", name)
    }
}

fn blank_server(id: &str) -> Server {
    Server {
        id: id.into(),
        name: String::new(),
        status: ServerStatus::Build,
        metadata: BTreeMap::new(),
        fault: None,
    }
}

/// Configuration attaching to an existing network `net-pod`
pub fn network_config() -> MachineProviderConfig {
    let mut config = MachineProviderConfig {
        region: "RegionOne".into(),
        network_id: Some("net-pod".into()),
        security_groups: vec!["nodes".into()],
        image_name: "ubuntu-22.04".into(),
        flavor_name: "m1.large".into(),
        availability_zone: "nova".into(),
        key_name: "ops".into(),
        pod_network_cidr: POD_CIDR.into(),
        ..Default::default()
    };
    config.tags.insert(CLUSTER_TAG.into(), "1".into());
    config.tags.insert(ROLE_TAG.into(), "1".into());
    config
}

/// Configuration pre-allocating a port on subnet `sub-1`
pub fn subnet_config() -> MachineProviderConfig {
    MachineProviderConfig {
        subnet_id: Some("sub-1".into()),
        security_groups: vec!["nodes".into(), "ssh".into()],
        ..network_config()
    }
}

/// Configuration with an ordered network list
pub fn list_config(networks: Vec<NetworkSpec>) -> MachineProviderConfig {
    MachineProviderConfig {
        network_id: None,
        networks,
        ..network_config()
    }
}

pub fn short_timeouts() -> WaitTimeouts {
    WaitTimeouts {
        build: WaitPolicy {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        },
        delete: WaitPolicy {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        },
    }
}

pub fn executor(cloud: &Arc<FakeCloud>, config: MachineProviderConfig) -> Executor {
    Executor::new(cloud.clone(), cloud.clone(), config).with_timeouts(short_timeouts())
}
