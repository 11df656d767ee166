//! Machine lifecycle core
//!
//! Creates, locates, enumerates and deletes OpenStack servers on behalf of
//! a cluster node-management controller. Provider access goes through the
//! [`Compute`](osmachine_cloud::Compute) and
//! [`Network`](osmachine_cloud::Network) capabilities.
//!
//! # Example
//!
//! ```ignore
//! use osmachine_core::Executor;
//! use std::sync::Arc;
//!
//! let executor = Executor::new(Arc::new(compute), Arc::new(network), config);
//!
//! let provider_id = executor.create_machine("shoot--dev-worker-0", &user_data).await?;
//! let machines = executor.list_machines().await?;
//! executor.delete_machine("shoot--dev-worker-0", Some(&provider_id)).await?;
//! ```

pub mod error;
pub mod executor;
pub mod locator;
pub mod network;
pub mod poller;
pub mod provider_id;
pub mod provisioner;
pub mod tags;

pub use error::{MachineError, Result};
pub use executor::{Executor, WaitTimeouts};
pub use locator::Locator;
pub use network::NetworkResolver;
pub use poller::{WaitPolicy, wait_for_status};
pub use provider_id::{ProviderId, encode};
pub use provisioner::{Provisioner, RequestLayer};
pub use tags::OwnershipTags;
