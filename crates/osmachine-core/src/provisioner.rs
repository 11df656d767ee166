//! Server create request assembly and submission

use crate::error::{CloudResultExt, Result};
use osmachine_cloud::{
    BlockDevice, Compute, CreateServerRequest, SchedulerHints, Server, ServerNetwork,
};
use osmachine_config::MachineProviderConfig;

/// Optional layers applied on top of the base request, in this order
///
/// Each layer only adds fields; none removes what an earlier step set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLayer {
    KeyPair,
    SchedulerHints,
    BootFromVolume,
}

impl RequestLayer {
    pub const ALL: [RequestLayer; 3] = [
        RequestLayer::KeyPair,
        RequestLayer::SchedulerHints,
        RequestLayer::BootFromVolume,
    ];

    pub fn applies(self, config: &MachineProviderConfig) -> bool {
        match self {
            // The provider decides what an empty key name means
            RequestLayer::KeyPair => true,
            RequestLayer::SchedulerHints => config.server_group_id().is_some(),
            RequestLayer::BootFromVolume => config.root_volume_size().is_some(),
        }
    }

    pub fn apply(self, request: &mut CreateServerRequest, config: &MachineProviderConfig) {
        match self {
            RequestLayer::KeyPair => {
                request.key_name = Some(config.key_name.clone());
            }
            RequestLayer::SchedulerHints => {
                if let Some(group) = config.server_group_id() {
                    request.scheduler_hints = Some(SchedulerHints {
                        group: group.to_string(),
                    });
                }
            }
            RequestLayer::BootFromVolume => {
                if let Some(size) = config.root_volume_size() {
                    let device = BlockDevice::root_volume_from_image(&request.image_ref, size);
                    tracing::debug!(?device, "booting from volume");
                    request.block_devices = vec![device];
                }
            }
        }
    }
}

pub struct Provisioner<'a> {
    compute: &'a dyn Compute,
    config: &'a MachineProviderConfig,
}

impl<'a> Provisioner<'a> {
    pub fn new(compute: &'a dyn Compute, config: &'a MachineProviderConfig) -> Self {
        Self { compute, config }
    }

    /// Build the full create request. Name resolution failures abort here,
    /// before anything is submitted.
    pub async fn build_request(
        &self,
        machine_name: &str,
        user_data: &[u8],
        networks: Vec<ServerNetwork>,
    ) -> Result<CreateServerRequest> {
        let image_ref = self.image_ref().await?;
        let flavor_ref = self
            .compute
            .flavor_id_from_name(&self.config.flavor_name)
            .await
            .context_with(|| {
                format!(
                    "error resolving flavor ID from flavor name {:?}",
                    self.config.flavor_name
                )
            })?;

        let mut request = CreateServerRequest {
            name: machine_name.to_string(),
            flavor_ref,
            image_ref,
            networks,
            security_groups: self.config.security_groups.clone(),
            metadata: self.config.tags.clone(),
            user_data: user_data.to_vec(),
            availability_zone: self.config.availability_zone.clone(),
            config_drive: self.config.use_config_drive,
            ..Default::default()
        };

        for layer in RequestLayer::ALL {
            if layer.applies(self.config) {
                layer.apply(&mut request, self.config);
            }
        }

        Ok(request)
    }

    /// Submit exactly one create request. Never retried here.
    pub async fn deploy_server(
        &self,
        machine_name: &str,
        user_data: &[u8],
        networks: Vec<ServerNetwork>,
    ) -> Result<Server> {
        let request = self
            .build_request(machine_name, user_data, networks)
            .await?;

        let submitted = if request.boots_from_volume() {
            self.compute.boot_from_volume(&request).await
        } else {
            self.compute.create_server(&request).await
        };

        submitted.context_with(|| format!("failed to create server [Name={:?}]", machine_name))
    }

    async fn image_ref(&self) -> Result<String> {
        if let Some(id) = self.config.image_id() {
            return Ok(id.to_string());
        }
        self.compute
            .image_id_from_name(&self.config.image_name)
            .await
            .context_with(|| {
                format!(
                    "error resolving image ID from image name {:?}",
                    self.config.image_name
                )
            })
    }
}
