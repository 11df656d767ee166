use osmachine_cloud::{CloudError, Fault, ServerStatus};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MachineError {
    #[error("could not find {resource} [{name}]")]
    NotFound { resource: &'static str, name: String },

    #[error("found more than one server [Name={name:?}]")]
    MultipleFound { name: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not parse server ID from provider ID {0:?}")]
    MalformedProviderId(String),

    #[error("server [ID={id:?}] reached unexpected status \"{status}\", fault: {}", fault_text(.fault))]
    Rejected {
        id: String,
        status: ServerStatus,
        fault: Option<Fault>,
    },

    #[error("server [ID={id:?}] reached unexpected status \"{status}\"")]
    UnexpectedStatus { id: String, status: ServerStatus },

    #[error("timed out after {after:?} waiting for server [ID={id:?}] to reach {target}")]
    Timeout {
        id: String,
        target: String,
        after: Duration,
    },

    #[error("{0}")]
    PodNetwork(String),

    #[error("{context}: {source}")]
    Cloud {
        context: String,
        #[source]
        source: CloudError,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<MachineError>,
    },

    #[error(
        "error deleting server [ID={id:?}] after unsuccessful creation attempt: {rollback}. Original error: {original}"
    )]
    RollbackFailed {
        id: String,
        original: Box<MachineError>,
        rollback: Box<MachineError>,
    },
}

fn fault_text(fault: &Option<Fault>) -> String {
    match fault {
        Some(f) => f.to_string(),
        None => "<none>".to_string(),
    }
}

impl MachineError {
    pub fn not_found(resource: &'static str, name: impl Into<String>) -> Self {
        MachineError::NotFound {
            resource,
            name: name.into(),
        }
    }

    /// Wrap an error with the operation and identifier it happened in
    pub fn context(self, context: impl Into<String>) -> Self {
        MachineError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True when the underlying cause is an absent resource, looking
    /// through context wrappers.
    pub fn is_not_found(&self) -> bool {
        match self {
            MachineError::NotFound { .. } => true,
            MachineError::Cloud { source, .. } => source.is_not_found(),
            MachineError::Context { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// The innermost error, skipping context wrappers
    pub fn root(&self) -> &MachineError {
        match self {
            MachineError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach context to capability errors
pub(crate) trait CloudResultExt<T> {
    fn context_with<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> CloudResultExt<T> for std::result::Result<T, CloudError> {
    fn context_with<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| MachineError::Cloud {
            context: f().into(),
            source,
        })
    }
}

pub type Result<T> = std::result::Result<T, MachineError>;
