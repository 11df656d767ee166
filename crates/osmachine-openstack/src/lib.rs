//! OpenStack backend for osmachine
//!
//! Implements the [`Compute`](osmachine_cloud::Compute) and
//! [`Network`](osmachine_cloud::Network) capabilities by driving the
//! `openstack` CLI (python-openstackclient).
//!
//! # Requirements
//!
//! - `openstack` CLI must be installed
//! - Authentication is taken from `OS_*` variables or `clouds.yaml`
//!
//! # Example
//!
//! ```ignore
//! use osmachine_openstack::{OpenStackCli, OpenStackProvider};
//! use osmachine_cloud::Compute;
//!
//! let provider = OpenStackProvider::new(OpenStackCli::new("RegionOne").with_cloud("prod"));
//! let server = provider.get_server("8d5a...").await?;
//! ```

pub mod cli;
pub mod error;
pub mod provider;
pub mod wire;

pub use cli::OpenStackCli;
pub use error::{OpenStackError, Result};
pub use provider::OpenStackProvider;
