//! ARN parsing for Search queries
//!
//! The default Search contract treats the query string as an ARN:
//! `arn:partition:service:region:account-id:resource`. The resource segment
//! comes in `type/id`, `type:id`, and bare forms.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::scope::Scope;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    /// Empty for global services (IAM, S3, ...)
    pub region: String,
    /// Empty for some provider-owned resources
    pub account_id: String,
    /// Everything after the fifth colon, separators included
    pub resource: String,
}

impl Arn {
    pub fn parse(s: &str) -> DiscoveryResult<Self> {
        let mut parts = s.splitn(6, ':');

        let prefix = parts.next().unwrap_or_default();
        if prefix != "arn" {
            return Err(DiscoveryError::invalid_query(format!(
                "expected an ARN, got {s:?}"
            )));
        }

        let partition = parts.next().unwrap_or_default();
        let service = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();
        let account_id = parts.next().unwrap_or_default();
        let resource = parts.next().unwrap_or_default();

        if partition.is_empty() || service.is_empty() || resource.is_empty() {
            return Err(DiscoveryError::invalid_query(format!(
                "ARN {s:?} is missing its partition, service or resource segment"
            )));
        }

        if !account_id.is_empty() && !account_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(DiscoveryError::invalid_query(format!(
                "ARN account id {account_id:?} is not numeric"
            )));
        }

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource: resource.to_string(),
        })
    }

    /// The resource id with any leading `type/` or `type:` prefix stripped
    pub fn resource_id(&self) -> &str {
        match self.resource.split_once(['/', ':']) {
            Some((_, id)) => id,
            None => &self.resource,
        }
    }

    /// Scope the ARN points into, with empty segments taken from `local`
    pub fn scope_or(&self, local: &Scope) -> Scope {
        local.peer(&self.account_id, &self.region)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_resource() {
        let arn =
            Arn::parse("arn:aws:ec2:us-east-1:123456789012:instance/i-0abc123def456").unwrap();
        assert_eq!(arn.service, "ec2");
        assert_eq!(arn.region, "us-east-1");
        assert_eq!(arn.account_id, "123456789012");
        assert_eq!(arn.resource_id(), "i-0abc123def456");
    }

    #[test]
    fn test_parse_colon_resource() {
        let arn = Arn::parse("arn:aws:kms:eu-west-1:123456789012:key:mrk-1234").unwrap();
        assert_eq!(arn.resource_id(), "mrk-1234");
    }

    #[test]
    fn test_parse_bare_resource() {
        let arn = Arn::parse("arn:aws:s3:::my-bucket").unwrap();
        assert_eq!(arn.region, "");
        assert_eq!(arn.account_id, "");
        assert_eq!(arn.resource_id(), "my-bucket");
    }

    #[test]
    fn test_multi_segment_resource_keeps_tail() {
        let arn = Arn::parse(
            "arn:aws:elasticloadbalancing:us-east-1:123456789012:loadbalancer/app/web/50dc6c495c0c9188",
        )
        .unwrap();
        assert_eq!(arn.resource_id(), "app/web/50dc6c495c0c9188");
    }

    #[test]
    fn test_rejects_non_arn() {
        assert!(Arn::parse("i-0abc123def456").is_err());
        assert!(Arn::parse("arn:aws:ec2").is_err());
        assert!(Arn::parse("arn:aws:ec2:us-east-1:not-numeric:instance/i-0abc").is_err());
    }

    #[test]
    fn test_scope_or_uses_local_for_global_services() {
        let local = Scope::new("123456789012", "us-east-1");
        let arn = Arn::parse("arn:aws:iam::999999999999:role/deployer").unwrap();
        assert_eq!(arn.scope_or(&local), Scope::new("999999999999", "us-east-1"));
    }

    #[test]
    fn test_display_round_trip() {
        let raw = "arn:aws:ec2:us-east-1:123456789012:volume/vol-0abc";
        assert_eq!(Arn::parse(raw).unwrap().to_string(), raw);
    }
}
