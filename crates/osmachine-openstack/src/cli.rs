//! openstack CLI wrapper
//!
//! Every call runs one `openstack` command with `-f json` and parses its
//! stdout. Credentials come from the usual `OS_*` environment or
//! `clouds.yaml`; only the cloud name and region are passed explicitly.

use crate::error::{OpenStackError, Result, classify_failure};
use osmachine_cloud::{CreatePortRequest, CreateServerRequest, ServerNetwork};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

pub const DEFAULT_BINARY: &str = "openstack";

pub struct OpenStackCli {
    region: String,
    cloud: Option<String>,
    binary: String,
}

impl OpenStackCli {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            cloud: None,
            binary: DEFAULT_BINARY.to_string(),
        }
    }

    /// Select a `clouds.yaml` entry
    pub fn with_cloud(mut self, cloud: impl Into<String>) -> Self {
        self.cloud = Some(cloud.into());
        self
    }

    /// Use a different executable, e.g. a wrapper script
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(cloud) = &self.cloud {
            args.push("--os-cloud".to_string());
            args.push(cloud.clone());
        }
        if !self.region.is_empty() {
            args.push("--os-region-name".to_string());
            args.push(self.region.clone());
        }
        args
    }

    /// Run a command and return stdout. `subject` names the resource the
    /// command is about, for not-found classification.
    pub async fn run(&self, args: &[String], subject: &str) -> Result<String> {
        let command = args.iter().take(2).cloned().collect::<Vec<_>>().join(" ");

        let mut cmd = Command::new(&self.binary);
        cmd.args(self.global_args());
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.binary, args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OpenStackError::CliNotFound(self.binary.clone())
            } else {
                OpenStackError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&command, subject, &stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run a command that prints JSON
    pub async fn run_json<T: DeserializeOwned>(&self, args: &[String], subject: &str) -> Result<T> {
        let mut args = args.to_vec();
        args.extend(["-f".to_string(), "json".to_string()]);

        let output = self.run(&args, subject).await?;
        let trimmed = output.trim();
        let text = if trimmed.is_empty() { "[]" } else { trimmed };

        serde_json::from_str(text).map_err(|source| OpenStackError::Output {
            command: args.iter().take(2).cloned().collect::<Vec<_>>().join(" "),
            source,
        })
    }
}

pub(crate) fn strings<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Arguments for `server create`, without output format flags
pub fn server_create_args(request: &CreateServerRequest, user_data: Option<&Path>) -> Vec<String> {
    let mut args = strings(["server", "create", "--flavor"]);
    args.push(request.flavor_ref.clone());

    if request.boots_from_volume() {
        for device in &request.block_devices {
            args.push("--block-device".to_string());
            args.push(format!(
                "uuid={},source_type={},destination_type={},volume_size={},boot_index={},delete_on_termination={}",
                device.uuid,
                device.source_type,
                device.destination_type,
                device.volume_size,
                device.boot_index,
                device.delete_on_termination
            ));
        }
    } else {
        args.push("--image".to_string());
        args.push(request.image_ref.clone());
    }

    for network in &request.networks {
        args.push("--nic".to_string());
        args.push(nic(network));
    }

    for group in &request.security_groups {
        args.push("--security-group".to_string());
        args.push(group.clone());
    }

    for (key, value) in &request.metadata {
        args.push("--property".to_string());
        args.push(format!("{}={}", key, value));
    }

    if !request.availability_zone.is_empty() {
        args.push("--availability-zone".to_string());
        args.push(request.availability_zone.clone());
    }

    if let Some(key_name) = &request.key_name {
        args.push("--key-name".to_string());
        args.push(key_name.clone());
    }

    match request.config_drive {
        Some(true) => args.extend(strings(["--config-drive", "True"])),
        Some(false) => args.extend(strings(["--config-drive", "False"])),
        None => {}
    }

    if let Some(hints) = &request.scheduler_hints {
        args.push("--hint".to_string());
        args.push(format!("group={}", hints.group));
    }

    if let Some(path) = user_data {
        args.push("--user-data".to_string());
        args.push(path.display().to_string());
    }

    args.push(request.name.clone());
    args
}

fn nic(network: &ServerNetwork) -> String {
    match &network.port {
        Some(port) => format!("port-id={}", port),
        None => format!("net-id={}", network.uuid),
    }
}

/// Arguments for `port create`, without output format flags
pub fn port_create_args(request: &CreatePortRequest) -> Vec<String> {
    let mut args = strings(["port", "create", "--network"]);
    args.push(request.network_id.clone());

    for fixed_ip in &request.fixed_ips {
        args.push("--fixed-ip".to_string());
        args.push(format!("subnet={}", fixed_ip.subnet_id));
    }

    for pair in &request.allowed_address_pairs {
        args.push("--allowed-address".to_string());
        args.push(allowed_address(&pair.ip_address, pair.mac_address.as_deref()));
    }

    if request.security_groups.is_empty() {
        args.push("--no-security-group".to_string());
    }
    for group in &request.security_groups {
        args.push("--security-group".to_string());
        args.push(group.clone());
    }

    args.push(request.name.clone());
    args
}

pub(crate) fn allowed_address(ip_address: &str, mac_address: Option<&str>) -> String {
    match mac_address {
        Some(mac) => format!("ip-address={},mac-address={}", ip_address, mac),
        None => format!("ip-address={}", ip_address),
    }
}

/// Write user data to a private temp file that lives as long as the handle
pub(crate) fn user_data_file(user_data: &[u8]) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("osmachine-user-data-")
        .tempfile()?;
    file.write_all(user_data)?;
    file.flush()?;
    Ok(file)
}
