//! Compute and network capabilities on top of the openstack CLI

use crate::cli::{
    OpenStackCli, allowed_address, port_create_args, server_create_args, strings, user_data_file,
};
use crate::error::{OpenStackError, Result};
use crate::wire::{PortRecord, Row, ServerRecord, ServerRow, SubnetRecord};
use async_trait::async_trait;
use osmachine_cloud::{
    Compute, CreatePortRequest, CreateServerRequest, Network, Port, PortListFilter, Server,
    ServerListFilter, Subnet, UpdatePortRequest,
};

/// OpenStack provider for one region
pub struct OpenStackProvider {
    cli: OpenStackCli,
}

impl OpenStackProvider {
    pub fn new(cli: OpenStackCli) -> Self {
        Self { cli }
    }

    pub fn region(&self) -> &str {
        self.cli.region()
    }

    async fn submit(&self, request: &CreateServerRequest) -> Result<Server> {
        let user_data = if request.user_data.is_empty() {
            None
        } else {
            Some(user_data_file(&request.user_data)?)
        };

        let args = server_create_args(request, user_data.as_ref().map(|f| f.path()));
        let record: ServerRecord = self.cli.run_json(&args, &request.name).await?;

        tracing::debug!(name = %request.name, server_id = %record.id, "server create accepted");
        Ok(record.into())
    }

    /// Id of the single row named exactly `name`
    async fn id_from_name(&self, kind: &'static str, args: Vec<String>, name: &str) -> Result<String> {
        let rows: Vec<Row> = self.cli.run_json(&args, name).await?;
        single(kind, name, rows)
    }

    async fn show_port(&self, id: &str) -> Result<Port> {
        let record: PortRecord = self
            .cli
            .run_json(&[strings(["port", "show"]), vec![id.to_string()]].concat(), id)
            .await?;
        Ok(record.into())
    }
}

fn single(kind: &'static str, name: &str, rows: Vec<Row>) -> Result<String> {
    let mut ids: Vec<String> = rows
        .into_iter()
        .filter(|r| r.name == name)
        .map(|r| r.id)
        .collect();

    match ids.len() {
        0 => Err(OpenStackError::NotFound {
            kind,
            name: name.to_string(),
        }),
        1 => Ok(ids.remove(0)),
        _ => Err(OpenStackError::MultipleFound {
            kind,
            name: name.to_string(),
        }),
    }
}

#[async_trait]
impl Compute for OpenStackProvider {
    async fn create_server(
        &self,
        request: &CreateServerRequest,
    ) -> osmachine_cloud::Result<Server> {
        Ok(self.submit(request).await?)
    }

    async fn boot_from_volume(
        &self,
        request: &CreateServerRequest,
    ) -> osmachine_cloud::Result<Server> {
        Ok(self.submit(request).await?)
    }

    async fn get_server(&self, id: &str) -> osmachine_cloud::Result<Server> {
        let args = [strings(["server", "show"]), vec![id.to_string()]].concat();
        let record: ServerRecord = self.cli.run_json(&args, id).await?;
        Ok(record.into())
    }

    async fn list_servers(&self, filter: &ServerListFilter) -> osmachine_cloud::Result<Vec<Server>> {
        let mut args = strings(["server", "list", "--long"]);
        if let Some(name) = &filter.name {
            args.push("--name".to_string());
            args.push(name.clone());
        }

        let rows: Vec<ServerRow> = self.cli.run_json(&args, "").await?;
        Ok(rows.into_iter().map(Server::from).collect())
    }

    async fn delete_server(&self, id: &str) -> osmachine_cloud::Result<()> {
        let args = [strings(["server", "delete"]), vec![id.to_string()]].concat();
        self.cli.run(&args, id).await?;
        Ok(())
    }

    async fn image_id_from_name(&self, name: &str) -> osmachine_cloud::Result<String> {
        let args = [strings(["image", "list", "--name"]), vec![name.to_string()]].concat();
        Ok(self.id_from_name("image", args, name).await?)
    }

    async fn flavor_id_from_name(&self, name: &str) -> osmachine_cloud::Result<String> {
        Ok(self
            .id_from_name("flavor", strings(["flavor", "list", "--all"]), name)
            .await?)
    }
}

#[async_trait]
impl Network for OpenStackProvider {
    async fn get_subnet(&self, id: &str) -> osmachine_cloud::Result<Subnet> {
        let args = [strings(["subnet", "show"]), vec![id.to_string()]].concat();
        let record: SubnetRecord = self.cli.run_json(&args, id).await?;
        Ok(record.into())
    }

    async fn create_port(&self, request: &CreatePortRequest) -> osmachine_cloud::Result<Port> {
        let record: PortRecord = self
            .cli
            .run_json(&port_create_args(request), &request.name)
            .await?;
        tracing::debug!(name = %request.name, port_id = %record.id, "created port");
        Ok(record.into())
    }

    async fn update_port(
        &self,
        id: &str,
        request: &UpdatePortRequest,
    ) -> osmachine_cloud::Result<Port> {
        if let Some(pairs) = &request.allowed_address_pairs {
            let mut args = strings(["port", "set", "--no-allowed-address"]);
            for pair in pairs {
                args.push("--allowed-address".to_string());
                args.push(allowed_address(&pair.ip_address, pair.mac_address.as_deref()));
            }
            args.push(id.to_string());
            self.cli.run(&args, id).await?;
        }
        Ok(self.show_port(id).await?)
    }

    async fn delete_port(&self, id: &str) -> osmachine_cloud::Result<()> {
        let args = [strings(["port", "delete"]), vec![id.to_string()]].concat();
        self.cli.run(&args, id).await?;
        Ok(())
    }

    async fn list_ports(&self, filter: &PortListFilter) -> osmachine_cloud::Result<Vec<Port>> {
        let mut args = strings(["port", "list"]);
        if let Some(device_id) = &filter.device_id {
            args.push("--device-id".to_string());
            args.push(device_id.clone());
        }
        if let Some(name) = &filter.name {
            args.push("--name".to_string());
            args.push(name.clone());
        }

        // list rows carry no network or address pair columns
        let rows: Vec<Row> = self.cli.run_json(&args, "").await?;
        let mut ports = Vec::with_capacity(rows.len());
        for row in rows {
            match self.show_port(&row.id).await {
                Ok(port) => ports.push(port),
                Err(OpenStackError::NotFound { .. }) => {
                    tracing::debug!(port_id = %row.id, "port vanished while listing");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(ports)
    }

    async fn network_id_from_name(&self, name: &str) -> osmachine_cloud::Result<String> {
        let args = [strings(["network", "list", "--name"]), vec![name.to_string()]].concat();
        Ok(self.id_from_name("network", args, name).await?)
    }

    async fn port_id_from_name(&self, name: &str) -> osmachine_cloud::Result<String> {
        let args = [strings(["port", "list", "--name"]), vec![name.to_string()]].concat();
        Ok(self.id_from_name("port", args, name).await?)
    }

    async fn security_group_id_from_name(&self, name: &str) -> osmachine_cloud::Result<String> {
        Ok(self
            .id_from_name("security group", strings(["security", "group", "list"]), name)
            .await?)
    }
}
