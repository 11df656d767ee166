//! Capability traits implemented by provider backends

use crate::error::Result;
use crate::model::{
    CreatePortRequest, CreateServerRequest, Port, PortListFilter, Server, ServerListFilter,
    Subnet, UpdatePortRequest,
};
use async_trait::async_trait;

/// Compute capability
///
/// Wraps the compute service of a single region. Absent resources must be
/// reported as [`CloudError::NotFound`](crate::CloudError::NotFound).
#[async_trait]
pub trait Compute: Send + Sync {
    /// Submit a server create request that boots directly from an image
    async fn create_server(&self, request: &CreateServerRequest) -> Result<Server>;

    /// Submit a server create request whose root disk is described by
    /// `request.block_devices`
    async fn boot_from_volume(&self, request: &CreateServerRequest) -> Result<Server>;

    async fn get_server(&self, id: &str) -> Result<Server>;

    async fn list_servers(&self, filter: &ServerListFilter) -> Result<Vec<Server>>;

    async fn delete_server(&self, id: &str) -> Result<()>;

    /// Resolve an image name to its id; fails if none or several match
    async fn image_id_from_name(&self, name: &str) -> Result<String>;

    /// Resolve a flavor name to its id; fails if none or several match
    async fn flavor_id_from_name(&self, name: &str) -> Result<String>;
}

/// Network capability
#[async_trait]
pub trait Network: Send + Sync {
    async fn get_subnet(&self, id: &str) -> Result<Subnet>;

    async fn create_port(&self, request: &CreatePortRequest) -> Result<Port>;

    async fn update_port(&self, id: &str, request: &UpdatePortRequest) -> Result<Port>;

    async fn delete_port(&self, id: &str) -> Result<()>;

    async fn list_ports(&self, filter: &PortListFilter) -> Result<Vec<Port>>;

    async fn network_id_from_name(&self, name: &str) -> Result<String>;

    async fn port_id_from_name(&self, name: &str) -> Result<String>;

    async fn security_group_id_from_name(&self, name: &str) -> Result<String>;
}
