//! OpenStack backend error types

use osmachine_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("openstack CLI not found: {0}. Please install python-openstackclient")]
    CliNotFound(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("more than one {kind} matches {name:?}")]
    MultipleFound { kind: &'static str, name: String },

    #[error("openstack {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("unexpected output from openstack {command}: {source}")]
    Output {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OpenStackError>;

impl From<OpenStackError> for CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::NotFound { .. } => CloudError::NotFound(err.to_string()),
            OpenStackError::MultipleFound { .. } => CloudError::MultipleFound(err.to_string()),
            OpenStackError::CommandFailed { .. } | OpenStackError::CliNotFound(_) => {
                CloudError::CommandFailed(err.to_string())
            }
            OpenStackError::Output { .. } => CloudError::Api(err.to_string()),
            OpenStackError::Io(e) => CloudError::Io(e),
        }
    }
}

/// Map a failed command's stderr to an error kind.
///
/// The client reports absent resources in several wordings depending on
/// the service and client version.
pub(crate) fn classify_failure(command: &str, name: &str, stderr: &str) -> OpenStackError {
    let lower = stderr.to_lowercase();
    if lower.contains("more than one") {
        OpenStackError::MultipleFound {
            kind: "resource",
            name: name.to_string(),
        }
    } else if lower.contains("could not be found")
        || lower.contains("not found")
        || (lower.starts_with("no ") && lower.contains(" found"))
    {
        OpenStackError::NotFound {
            kind: "resource",
            name: name.to_string(),
        }
    } else {
        OpenStackError::CommandFailed {
            command: command.to_string(),
            stderr: stderr.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found_wordings() {
        for stderr in [
            "No server with a name or ID of 'abc' exists.\nNo Server found for abc",
            "Not Found (HTTP 404)",
            "Subnet abc could not be found.",
        ] {
            let err = classify_failure("server show", "abc", stderr);
            assert!(CloudError::from(err).is_not_found(), "{stderr}");
        }
    }

    #[test]
    fn test_classify_multiple() {
        let err = classify_failure(
            "image show",
            "ubuntu",
            "More than one Image exists with the name 'ubuntu'.",
        );
        assert!(matches!(
            CloudError::from(err),
            CloudError::MultipleFound(_)
        ));
    }

    #[test]
    fn test_classify_other_failure() {
        let err = classify_failure("server create", "node-0", "Quota exceeded for cores\n");
        match err {
            OpenStackError::CommandFailed { command, stderr } => {
                assert_eq!(command, "server create");
                assert_eq!(stderr, "Quota exceeded for cores");
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }
}
