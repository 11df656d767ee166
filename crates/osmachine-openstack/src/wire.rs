//! JSON records printed by `openstack ... -f json`
//!
//! `show` commands use lowercase snake_case keys; `list` commands use the
//! column titles. Older clients print structured fields as `k='v'` text,
//! so those fields accept both shapes.

use osmachine_cloud::{AddressPair, Fault, Port, Server, ServerStatus, Subnet};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A field printed either as structured JSON or as formatted text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Formatted<T> {
    Structured(T),
    Text(String),
}

/// `server show` / `server create`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: ServerStatus,
    #[serde(default)]
    pub properties: Option<Formatted<BTreeMap<String, serde_json::Value>>>,
    #[serde(default)]
    pub fault: Option<Fault>,
}

impl From<ServerRecord> for Server {
    fn from(record: ServerRecord) -> Self {
        Server {
            id: record.id,
            name: record.name,
            status: record.status,
            metadata: properties(record.properties),
            fault: record.fault,
        }
    }
}

/// `server list --long`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status")]
    pub status: ServerStatus,
    #[serde(rename = "Properties", default)]
    pub properties: Option<Formatted<BTreeMap<String, serde_json::Value>>>,
}

impl From<ServerRow> for Server {
    fn from(row: ServerRow) -> Self {
        Server {
            id: row.id,
            name: row.name,
            status: row.status,
            metadata: properties(row.properties),
            fault: None,
        }
    }
}

/// Any `list` row; only the id and name columns are read
#[derive(Debug, Clone, Deserialize)]
pub struct Row {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
}

/// `port show` / `port create`
#[derive(Debug, Clone, Deserialize)]
pub struct PortRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub allowed_address_pairs: Option<Formatted<Vec<AddressPair>>>,
    #[serde(default)]
    pub security_group_ids: Option<Formatted<Vec<String>>>,
}

impl From<PortRecord> for Port {
    fn from(record: PortRecord) -> Self {
        let allowed_address_pairs = match record.allowed_address_pairs {
            Some(Formatted::Structured(pairs)) => pairs,
            Some(Formatted::Text(text)) => text
                .lines()
                .filter_map(|line| {
                    let fields = key_values(line);
                    let ip = fields.get("ip_address")?;
                    Some(AddressPair {
                        ip_address: ip.clone(),
                        mac_address: fields.get("mac_address").cloned(),
                    })
                })
                .collect(),
            None => Vec::new(),
        };
        let security_groups = match record.security_group_ids {
            Some(Formatted::Structured(ids)) => ids,
            Some(Formatted::Text(text)) => text
                .split([',', '\n'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => Vec::new(),
        };

        Port {
            id: record.id,
            name: record.name,
            network_id: record.network_id,
            device_id: record.device_id,
            allowed_address_pairs,
            security_groups,
        }
    }
}

/// `subnet show`
#[derive(Debug, Clone, Deserialize)]
pub struct SubnetRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub cidr: String,
}

impl From<SubnetRecord> for Subnet {
    fn from(record: SubnetRecord) -> Self {
        Subnet {
            id: record.id,
            name: record.name,
            network_id: record.network_id,
            cidr: record.cidr,
        }
    }
}

fn properties(field: Option<Formatted<BTreeMap<String, serde_json::Value>>>) -> BTreeMap<String, String> {
    match field {
        Some(Formatted::Structured(map)) => map
            .into_iter()
            .map(|(k, v)| {
                let value = match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, value)
            })
            .collect(),
        Some(Formatted::Text(text)) => key_values(&text),
        None => BTreeMap::new(),
    }
}

/// Parse `a='1', b='2'` text; quoted values may contain `, `
fn key_values(text: &str) -> BTreeMap<String, String> {
    text.split("', ")
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            let v = v.trim();
            let v = v.strip_prefix('\'').unwrap_or(v);
            let v = v.strip_suffix('\'').unwrap_or(v);
            (k.trim().to_string(), v.to_string())
        })
        .collect()
}
