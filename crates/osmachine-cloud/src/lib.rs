//! osmachine cloud capabilities
//!
//! This crate defines the two capability interfaces the machine lifecycle
//! core consumes, together with the provider-side resource model they
//! exchange.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 osmachine CLI                    │
//! │        (create / delete / status / list)         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                osmachine-core                    │
//! │   Executor · Locator · Poller · Network Resolver │
//! └─────────────────┬───────────────────────────────┘
//!                   │ trait Compute / trait Network
//! ┌─────────────────▼───────────────────────────────┐
//! │               osmachine-cloud                    │
//! │      model · CloudError (shared error kind)      │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │  openstack CLI │
//!           │    backend     │
//!           └────────────────┘
//! ```

pub mod error;
pub mod model;
pub mod provider;

// Re-exports
pub use error::{CloudError, Result};
pub use model::{
    AddressPair, BlockDevice, CreatePortRequest, CreateServerRequest, Fault, FixedIp, Port,
    PortListFilter, SchedulerHints, Server, ServerListFilter, ServerNetwork, ServerStatus, Subnet,
    UpdatePortRequest,
};
pub use provider::{Compute, Network};
