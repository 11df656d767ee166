//! Machine provider configuration model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag key prefix naming the cluster a server belongs to
pub const CLUSTER_TAG_PREFIX: &str = "kubernetes.io-cluster-";

/// Tag key prefix naming the node role of a server
pub const ROLE_TAG_PREFIX: &str = "kubernetes.io-role-";

/// Per-request machine configuration
///
/// Immutable once loaded. Empty strings are treated the same as absent
/// values, so `networkID: ""` in YAML selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineProviderConfig {
    pub region: String,

    #[serde(default, rename = "networkID", skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,

    #[serde(default, rename = "subnetID", skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<NetworkSpec>,

    #[serde(default)]
    pub security_groups: Vec<String>,

    #[serde(default, rename = "imageID", skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,

    #[serde(default)]
    pub image_name: String,

    #[serde(default)]
    pub flavor_name: String,

    #[serde(default)]
    pub availability_zone: String,

    #[serde(default)]
    pub key_name: String,

    /// Server metadata. The ownership tags live here.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default, rename = "serverGroupID", skip_serializing_if = "Option::is_none")]
    pub server_group_id: Option<String>,

    /// Root disk size in GiB; a positive value boots from volume
    #[serde(default)]
    pub root_disk_size: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_config_drive: Option<bool>,

    #[serde(default)]
    pub pod_network_cidr: String,
}

/// An entry of the ordered network list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Ports on this network carry pod traffic
    #[serde(default)]
    pub pod_network: bool,
}

/// How a new server is attached to the network, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkSelection<'a> {
    /// Existing network with a pre-allocated port on the given subnet
    Subnet {
        network_id: &'a str,
        subnet_id: &'a str,
    },
    /// Existing network, provider picks subnet and address
    Network { network_id: &'a str },
    /// Ordered list of networks, resolved by id or name
    List(&'a [NetworkSpec]),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl MachineProviderConfig {
    pub fn network_id(&self) -> Option<&str> {
        non_empty(&self.network_id)
    }

    pub fn subnet_id(&self) -> Option<&str> {
        non_empty(&self.subnet_id)
    }

    pub fn image_id(&self) -> Option<&str> {
        non_empty(&self.image_id)
    }

    pub fn server_group_id(&self) -> Option<&str> {
        non_empty(&self.server_group_id)
    }

    /// Root disk size when boot-from-volume is requested
    pub fn root_volume_size(&self) -> Option<u32> {
        u32::try_from(self.root_disk_size).ok().filter(|s| *s > 0)
    }

    pub fn network_selection(&self) -> NetworkSelection<'_> {
        match (self.network_id(), self.subnet_id()) {
            (Some(network_id), Some(subnet_id)) => NetworkSelection::Subnet {
                network_id,
                subnet_id,
            },
            (Some(network_id), None) => NetworkSelection::Network { network_id },
            _ => NetworkSelection::List(&self.networks),
        }
    }

    /// First tag key starting with [`CLUSTER_TAG_PREFIX`]
    pub fn cluster_tag_key(&self) -> Option<&str> {
        self.tag_key_with_prefix(CLUSTER_TAG_PREFIX)
    }

    /// First tag key starting with [`ROLE_TAG_PREFIX`]
    pub fn role_tag_key(&self) -> Option<&str> {
        self.tag_key_with_prefix(ROLE_TAG_PREFIX)
    }

    fn tag_key_with_prefix(&self, prefix: &str) -> Option<&str> {
        self.tags
            .keys()
            .find(|k| k.starts_with(prefix))
            .map(String::as_str)
    }
}
