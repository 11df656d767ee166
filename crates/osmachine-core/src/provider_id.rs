//! Provider ID encoding
//!
//! The only identifier the external controller persists for a machine:
//! `openstack:///<region>/<server-id>`.
//!
//! Region names never contain `/`; everything after the first `/` is the
//! server id.

use crate::error::{MachineError, Result};
use std::fmt;
use std::str::FromStr;

/// Scheme prefix of every encoded provider ID
pub const PROVIDER_ID_SCHEME: &str = "openstack";

const SEPARATOR: &str = ":///";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId {
    region: String,
    server_id: String,
}

impl ProviderId {
    pub fn new(region: impl Into<String>, server_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            server_id: server_id.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Decode `openstack:///<region>/<server-id>`
    ///
    /// Fails when the scheme is wrong or either component is empty.
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = || MachineError::MalformedProviderId(value.to_string());

        let rest = value
            .strip_prefix(PROVIDER_ID_SCHEME)
            .and_then(|r| r.strip_prefix(SEPARATOR))
            .ok_or_else(malformed)?;
        let (region, server_id) = rest.split_once('/').ok_or_else(malformed)?;

        if region.is_empty() || server_id.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(region, server_id))
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}/{}",
            PROVIDER_ID_SCHEME, SEPARATOR, self.region, self.server_id
        )
    }
}

impl FromStr for ProviderId {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Encode a region and server id
pub fn encode(region: &str, server_id: &str) -> String {
    ProviderId::new(region, server_id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode() {
        assert_eq!(
            encode("RegionOne", "7f3c-11"),
            "openstack:///RegionOne/7f3c-11"
        );
    }

    #[test]
    fn test_parse() {
        let id = ProviderId::parse("openstack:///eu-de-1/abc-123").unwrap();
        assert_eq!(id.region(), "eu-de-1");
        assert_eq!(id.server_id(), "abc-123");
    }

    #[test]
    fn test_server_id_may_contain_slash() {
        let id = ProviderId::parse(&encode("r", "a/b")).unwrap();
        assert_eq!(id.region(), "r");
        assert_eq!(id.server_id(), "a/b");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "abc-123",
            "aws:///eu-de-1/abc-123",
            "openstack://eu-de-1/abc-123",
            "openstack:///eu-de-1/",
            "openstack:///abc-123",
            "openstack:////abc-123",
        ] {
            assert!(
                matches!(
                    ProviderId::parse(bad),
                    Err(MachineError::MalformedProviderId(_))
                ),
                "{:?} should not parse",
                bad
            );
        }
    }

    proptest! {
        /// encode then decode yields the original pair
        #[test]
        fn prop_roundtrip(region in "[A-Za-z0-9._-]{1,24}", server_id in "[A-Za-z0-9._/-]{1,36}") {
            let decoded: ProviderId = encode(&region, &server_id).parse().unwrap();
            prop_assert_eq!(decoded.region(), region.as_str());
            prop_assert_eq!(decoded.server_id(), server_id.as_str());
        }
    }
}
