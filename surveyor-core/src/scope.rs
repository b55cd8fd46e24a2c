//! Scope - account and region composite key

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Where a resource lives: one account in one region.
///
/// Formatted as `"{account_id}.{region}"`. Links that cross an account or
/// region boundary must carry the peer's own scope, never reuse the local one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub account_id: String,
    pub region: String,
}

impl Scope {
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    /// Scope for a linked item living in another account and/or region.
    ///
    /// Empty peer segments fall back to this scope's own; provider identifiers
    /// for global services omit the region.
    pub fn peer(&self, account_id: &str, region: &str) -> Self {
        Self {
            account_id: if account_id.is_empty() {
                self.account_id.clone()
            } else {
                account_id.to_string()
            },
            region: if region.is_empty() {
                self.region.clone()
            } else {
                region.to_string()
            },
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.account_id, self.region)
    }
}

impl FromStr for Scope {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (account_id, region) = s.split_once('.').ok_or_else(|| {
            DiscoveryError::invalid_query(format!(
                "scope must be formatted as account.region, got {s:?}"
            ))
        })?;

        if account_id.is_empty() || region.is_empty() {
            return Err(DiscoveryError::invalid_query(format!(
                "scope segments must be non-empty, got {s:?}"
            )));
        }

        Ok(Self::new(account_id, region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        let scope = Scope::new("123456789012", "eu-west-2");
        assert_eq!(scope.to_string(), "123456789012.eu-west-2");
    }

    #[test]
    fn test_scope_round_trip() {
        let scope: Scope = "123456789012.ap-northeast-1".parse().unwrap();
        assert_eq!(scope.account_id, "123456789012");
        assert_eq!(scope.region, "ap-northeast-1");
        assert_eq!(
            scope.to_string().parse::<Scope>().unwrap(),
            Scope::new("123456789012", "ap-northeast-1")
        );
    }

    #[test]
    fn test_scope_rejects_malformed() {
        assert!("no-separator".parse::<Scope>().is_err());
        assert!(".us-east-1".parse::<Scope>().is_err());
        assert!("123456789012.".parse::<Scope>().is_err());
    }

    #[test]
    fn test_peer_falls_back_to_local_segments() {
        let scope = Scope::new("123456789012", "us-east-1");
        assert_eq!(
            scope.peer("", ""),
            Scope::new("123456789012", "us-east-1")
        );
        assert_eq!(
            scope.peer("999999999999", "eu-central-1"),
            Scope::new("999999999999", "eu-central-1")
        );
        assert_eq!(
            scope.peer("999999999999", ""),
            Scope::new("999999999999", "us-east-1")
        );
    }
}
