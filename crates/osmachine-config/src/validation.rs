//! Declarative configuration checks

use crate::error::ValidationError;
use crate::model::{CLUSTER_TAG_PREFIX, MachineProviderConfig, ROLE_TAG_PREFIX};
use std::net::IpAddr;

impl MachineProviderConfig {
    /// Collect every violation in the configuration.
    ///
    /// An empty vector means the configuration is usable.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.region.trim().is_empty() {
            errors.push(ValidationError::new("region", "must be set"));
        }
        if self.flavor_name.trim().is_empty() {
            errors.push(ValidationError::new("flavorName", "must be set"));
        }
        if self.image_id().is_none() && self.image_name.trim().is_empty() {
            errors.push(ValidationError::new(
                "imageName",
                "one of imageID or imageName must be set",
            ));
        }

        if self.subnet_id().is_some() && self.network_id().is_none() {
            errors.push(ValidationError::new(
                "subnetID",
                "can only be used together with networkID",
            ));
        }
        if self.network_id().is_none() && self.networks.is_empty() {
            errors.push(ValidationError::new(
                "networks",
                "one of networkID or networks must be set",
            ));
        }
        if self.network_id().is_some() && !self.networks.is_empty() {
            errors.push(ValidationError::new(
                "networks",
                "cannot be combined with networkID",
            ));
        }
        for (i, network) in self.networks.iter().enumerate() {
            if network.id.trim().is_empty() && network.name.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("networks[{}]", i),
                    "one of id or name must be set",
                ));
            }
        }
        if self.network_id().is_none()
            && !self.networks.is_empty()
            && !self.networks.iter().any(|n| n.pod_network)
        {
            errors.push(ValidationError::new(
                "networks",
                "at least one network must be marked as podNetwork",
            ));
        }

        if self.pod_network_cidr.trim().is_empty() {
            errors.push(ValidationError::new("podNetworkCidr", "must be set"));
        } else if !is_valid_cidr(&self.pod_network_cidr) {
            errors.push(ValidationError::new(
                "podNetworkCidr",
                format!("{:?} is not a valid CIDR", self.pod_network_cidr),
            ));
        }

        if self.root_disk_size < 0 {
            errors.push(ValidationError::new("rootDiskSize", "must not be negative"));
        }

        if self.cluster_tag_key().is_none() {
            errors.push(ValidationError::new(
                "tags",
                format!("a tag key starting with {:?} is required", CLUSTER_TAG_PREFIX),
            ));
        }
        if self.role_tag_key().is_none() {
            errors.push(ValidationError::new(
                "tags",
                format!("a tag key starting with {:?} is required", ROLE_TAG_PREFIX),
            ));
        }

        errors
    }
}

/// `addr/prefix` with an IPv4 or IPv6 address and an in-range prefix length
pub fn is_valid_cidr(value: &str) -> bool {
    let Some((addr, prefix)) = value.split_once('/') else {
        return false;
    };
    let Ok(addr) = addr.parse::<IpAddr>() else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr {
        IpAddr::V4(_) => prefix <= 32,
        IpAddr::V6(_) => prefix <= 128,
    }
}
