//! Server lookup by provider ID or name, and enumeration of owned servers
//!
//! Ownership is proven by [`OwnershipTags`]; servers without both tag keys
//! are invisible to every lookup here.

use crate::error::{CloudResultExt, MachineError, Result};
use crate::provider_id::{ProviderId, encode};
use crate::tags::OwnershipTags;
use osmachine_cloud::{Compute, Server, ServerListFilter};
use std::collections::BTreeMap;

pub struct Locator<'a> {
    compute: &'a dyn Compute,
}

impl<'a> Locator<'a> {
    pub fn new(compute: &'a dyn Compute) -> Self {
        Self { compute }
    }

    /// Fetch the server encoded in `provider_id`.
    ///
    /// A server that exists but lacks the ownership tags is reported as not
    /// found, with a warning. It is stale or foreign state, not a transient
    /// condition. Without configured tags ownership can never be proven.
    pub async fn by_provider_id(
        &self,
        provider_id: &str,
        tags: Option<&OwnershipTags>,
    ) -> Result<Server> {
        tracing::debug!(provider_id, "finding server with provider ID");
        let server_id = ProviderId::parse(provider_id)?.server_id().to_string();

        let server = match self.compute.get_server(&server_id).await {
            Ok(server) => server,
            Err(e) if e.is_not_found() => {
                tracing::debug!(server_id, "server not found");
                return Err(MachineError::not_found("server", format!("ID={:?}", server_id)));
            }
            Err(e) => {
                return Err(e).context_with(|| format!("error finding server [ID={:?}]", server_id));
            }
        };

        if tags.is_some_and(|t| t.owns(&server)) {
            return Ok(server);
        }

        tracing::warn!(
            server_id,
            "server found, but cluster/role tags are missing or not matching"
        );
        Err(MachineError::not_found("server", format!("ID={:?}", server_id)))
    }

    /// The single owned server named exactly `machine_name`.
    ///
    /// Several owned matches is an error of its own; the caller must not
    /// pick one.
    pub async fn by_name(&self, machine_name: &str, tags: &OwnershipTags) -> Result<Server> {
        let servers = self
            .compute
            .list_servers(&ServerListFilter::by_name(machine_name))
            .await
            .context_with(|| format!("failed to list servers [Name={:?}]", machine_name))?;

        let mut matching: Vec<Server> = servers
            .into_iter()
            .filter(|s| s.name == machine_name && tags.owns(s))
            .collect();

        match matching.len() {
            0 => Err(MachineError::not_found(
                "server",
                format!("Name={:?}", machine_name),
            )),
            1 => Ok(matching.remove(0)),
            _ => Err(MachineError::MultipleFound {
                name: machine_name.to_string(),
            }),
        }
    }

    /// Provider ID to name of every owned server
    pub async fn list_owned(
        &self,
        region: &str,
        tags: &OwnershipTags,
    ) -> Result<BTreeMap<String, String>> {
        let servers = self
            .compute
            .list_servers(&ServerListFilter::all())
            .await
            .context_with(|| "failed to list servers")?;

        Ok(servers
            .into_iter()
            .filter(|s| tags.owns(s))
            .map(|s| (encode(region, &s.id), s.name))
            .collect())
    }
}
