//! Provider-side resource model
//!
//! Plain data carried across the [`Compute`](crate::Compute) and
//! [`Network`](crate::Network) capabilities. Nothing here is cached by the
//! lifecycle core; every value is the result of a fresh provider query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Server status as reported by the compute service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerStatus {
    Build,
    Active,
    Error,
    /// Sentinel used by waits that drain a server; a server that can no
    /// longer be found is treated as being in this state.
    Deleted,
    /// Any other provider-defined status (SHUTOFF, REBUILD, ...)
    Other(String),
}

impl ServerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ServerStatus::Build => "BUILD",
            ServerStatus::Active => "ACTIVE",
            ServerStatus::Error => "ERROR",
            ServerStatus::Deleted => "DELETED",
            ServerStatus::Other(s) => s,
        }
    }
}

impl From<&str> for ServerStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "BUILD" => ServerStatus::Build,
            "ACTIVE" => ServerStatus::Active,
            "ERROR" => ServerStatus::Error,
            "DELETED" => ServerStatus::Deleted,
            other => ServerStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for ServerStatus {
    fn from(s: String) -> Self {
        ServerStatus::from(s.as_str())
    }
}

impl From<ServerStatus> for String {
    fn from(status: ServerStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fault detail attached to a server in ERROR state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={} message={:?}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " details={:?}", details)?;
        }
        Ok(())
    }
}

/// A compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub status: ServerStatus,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub fault: Option<Fault>,
}

impl Server {
    /// True when every given key is present in the server metadata.
    /// Values are not inspected.
    pub fn has_metadata_keys(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.metadata.contains_key(*k))
    }
}

/// An allowed source address on a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPair {
    pub ip_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

impl AddressPair {
    pub fn new(ip_address: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            mac_address: None,
        }
    }
}

/// A network attachment point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub allowed_address_pairs: Vec<AddressPair>,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

impl Port {
    pub fn allows(&self, ip_address: &str) -> bool {
        self.allowed_address_pairs
            .iter()
            .any(|p| p.ip_address == ip_address)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub cidr: String,
}

/// A network attachment requested at server creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerNetwork {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

impl ServerNetwork {
    pub fn network(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            port: None,
        }
    }

    pub fn with_port(uuid: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            port: Some(port.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerHints {
    /// Server group the instance is placed in
    pub group: String,
}

/// Block device mapping for boot-from-volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub uuid: String,
    /// Volume size in GiB
    pub volume_size: u32,
    pub boot_index: i32,
    pub delete_on_termination: bool,
    pub source_type: String,
    pub destination_type: String,
}

impl BlockDevice {
    /// A boot volume of `size` GiB created from `image_id` and removed
    /// together with the server.
    pub fn root_volume_from_image(image_id: impl Into<String>, size: u32) -> Self {
        Self {
            uuid: image_id.into(),
            volume_size: size,
            boot_index: 0,
            delete_on_termination: true,
            source_type: "image".to_string(),
            destination_type: "volume".to_string(),
        }
    }
}

/// Server create request
///
/// Built once and layered by the provisioner; submitted through either
/// [`Compute::create_server`](crate::Compute::create_server) or
/// [`Compute::boot_from_volume`](crate::Compute::boot_from_volume).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServerRequest {
    pub name: String,
    pub flavor_ref: String,
    pub image_ref: String,
    pub networks: Vec<ServerNetwork>,
    pub security_groups: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing)]
    pub user_data: Vec<u8>,
    pub availability_zone: String,
    pub config_drive: Option<bool>,
    pub key_name: Option<String>,
    pub scheduler_hints: Option<SchedulerHints>,
    #[serde(default)]
    pub block_devices: Vec<BlockDevice>,
}

impl CreateServerRequest {
    pub fn boots_from_volume(&self) -> bool {
        !self.block_devices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIp {
    pub subnet_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePortRequest {
    pub name: String,
    pub network_id: String,
    pub fixed_ips: Vec<FixedIp>,
    pub allowed_address_pairs: Vec<AddressPair>,
    pub security_groups: Vec<String>,
}

/// Port update request; `Some` fields replace the current value entirely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePortRequest {
    pub allowed_address_pairs: Option<Vec<AddressPair>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerListFilter {
    pub name: Option<String>,
}

impl ServerListFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortListFilter {
    pub device_id: Option<String>,
    pub name: Option<String>,
}

impl PortListFilter {
    pub fn by_device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            name: None,
        }
    }
}
