//! Ownership tags
//!
//! A server belongs to this cluster and node role when its metadata holds
//! both configured tag keys. Values are never compared.

use crate::error::{MachineError, Result};
use osmachine_cloud::Server;
use osmachine_config::{CLUSTER_TAG_PREFIX, MachineProviderConfig, ROLE_TAG_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTags {
    cluster_key: String,
    role_key: String,
}

impl OwnershipTags {
    pub fn new(cluster_key: impl Into<String>, role_key: impl Into<String>) -> Self {
        Self {
            cluster_key: cluster_key.into(),
            role_key: role_key.into(),
        }
    }

    /// Resolve both keys from the configured tags, `None` if either is missing
    pub fn from_config(config: &MachineProviderConfig) -> Option<Self> {
        Some(Self::new(config.cluster_tag_key()?, config.role_tag_key()?))
    }

    pub fn cluster_key(&self) -> &str {
        &self.cluster_key
    }

    pub fn role_key(&self) -> &str {
        &self.role_key
    }

    pub fn owns(&self, server: &Server) -> bool {
        server.has_metadata_keys(&[self.cluster_key.as_str(), self.role_key.as_str()])
    }
}

/// Tags resolved once per executor
///
/// Absent tags are a configuration error only for name-based lookups and
/// enumeration. Create never needs them, and a provider ID lookup treats
/// them as ownership not proven.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedTags(Option<OwnershipTags>);

impl ResolvedTags {
    pub(crate) fn from_config(config: &MachineProviderConfig) -> Self {
        Self(OwnershipTags::from_config(config))
    }

    pub(crate) fn get(&self) -> Option<&OwnershipTags> {
        self.0.as_ref()
    }

    pub(crate) fn require(&self, operation: &str) -> Result<&OwnershipTags> {
        self.0.as_ref().ok_or_else(|| {
            tracing::warn!("{} can not proceed: cluster/role tags are missing", operation);
            MachineError::InvalidConfig(format!(
                "{} can not proceed: tags with prefixes {:?} and {:?} are required",
                operation, CLUSTER_TAG_PREFIX, ROLE_TAG_PREFIX
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osmachine_cloud::ServerStatus;
    use std::collections::BTreeMap;

    fn server(keys: &[&str]) -> Server {
        Server {
            id: "s1".into(),
            name: "node-0".into(),
            status: ServerStatus::Active,
            metadata: keys
                .iter()
                .map(|k| (k.to_string(), String::new()))
                .collect::<BTreeMap<_, _>>(),
            fault: None,
        }
    }

    #[test]
    fn test_owns_requires_both_keys() {
        let tags = OwnershipTags::new("kubernetes.io-cluster-a", "kubernetes.io-role-node");

        assert!(tags.owns(&server(&["kubernetes.io-cluster-a", "kubernetes.io-role-node"])));
        assert!(!tags.owns(&server(&["kubernetes.io-cluster-a"])));
        assert!(!tags.owns(&server(&["kubernetes.io-cluster-b", "kubernetes.io-role-node"])));
    }

    #[test]
    fn test_missing_tags_is_config_error() {
        let config = MachineProviderConfig::default();
        let resolved = ResolvedTags::from_config(&config);

        assert!(matches!(
            resolved.require("list machines"),
            Err(MachineError::InvalidConfig(_))
        ));
    }
}
