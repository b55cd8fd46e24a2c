//! Per-resource-type adapters
//!
//! One module per API family. Each mapper hand-encodes the attribute names
//! and linkage rules of one CloudFormation resource shape: which fields name
//! other resources, which lookup method reaches them, and how blast
//! propagation flows across the edge.

pub mod ec2;
pub mod eks;
pub mod elbv2;
pub mod kms;

use std::sync::Arc;

use serde_json::{Map, Value};

use surveyor_core::adapter::{Adapter, AlwaysGetAdapter, DescribeOnlyAdapter, GetListAdapter};
use surveyor_core::error::{DiscoveryError, DiscoveryResult};
use surveyor_core::item::Item;
use surveyor_core::provider::ControlPlane;
use surveyor_core::scope::Scope;

use crate::tags::parse_tags;

/// Every adapter, bound to one account+region over a shared control plane
///
/// EC2 shapes list with full property documents; ELBv2 listings are
/// summary-shaped; KMS and EKS listings return identifiers only, so their
/// harness re-fetches each one.
pub fn adapters(control: Arc<dyn ControlPlane>, scope: &Scope) -> Vec<Box<dyn Adapter>> {
    vec![
        Box::new(DescribeOnlyAdapter::new(
            ec2::VpcMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::SubnetMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::InstanceMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::SecurityGroupMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::InternetGatewayMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::NatGatewayMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::AddressMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::RouteTableMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(DescribeOnlyAdapter::new(
            ec2::VolumeMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(GetListAdapter::new(
            elbv2::LoadBalancerMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(GetListAdapter::new(
            elbv2::TargetGroupMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(GetListAdapter::new(
            elbv2::ListenerMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(AlwaysGetAdapter::new(
            kms::KeyMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(AlwaysGetAdapter::new(
            kms::AliasMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(AlwaysGetAdapter::new(
            eks::ClusterMapper,
            control.clone(),
            scope.clone(),
        )),
        Box::new(AlwaysGetAdapter::new(
            eks::NodegroupMapper,
            control,
            scope.clone(),
        )),
    ]
}

// =============================================================================
// Shared mapping helpers
// =============================================================================

/// Item with the flattened property bag and parsed tags, before linkage
pub(crate) fn base_item(
    item_type: &'static str,
    unique_attribute: &'static str,
    scope: &Scope,
    properties: &Value,
) -> DiscoveryResult<Item> {
    let attributes: Map<String, Value> = properties.as_object().cloned().ok_or_else(|| {
        DiscoveryError::mapping(item_type, "property document is not a JSON object")
    })?;

    Ok(Item::new(item_type, unique_attribute, scope.clone())
        .with_attributes(attributes)
        .with_tags(parse_tags(properties)))
}

pub(crate) fn str_prop<'a>(properties: &'a Value, key: &str) -> Option<&'a str> {
    properties.get(key).and_then(Value::as_str)
}

pub(crate) fn str_list(properties: &Value, key: &str) -> Vec<String> {
    properties
        .get(key)
        .and_then(Value::as_array)
        .map(|array| {
            array
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use surveyor_core::provider::{ResourceDescription, ResourcePage};

    struct NullControlPlane;

    #[async_trait]
    impl ControlPlane for NullControlPlane {
        async fn get(
            &self,
            _type_name: &str,
            _identifier: &str,
        ) -> DiscoveryResult<Option<ResourceDescription>> {
            Ok(None)
        }

        async fn list_page(
            &self,
            _type_name: &str,
            _next_token: Option<&str>,
        ) -> DiscoveryResult<ResourcePage> {
            Ok(ResourcePage::default())
        }
    }

    #[test]
    fn test_registry_item_types_are_unique() {
        let scope = Scope::new("123456789012", "us-east-1");
        let all = adapters(Arc::new(NullControlPlane), &scope);
        assert_eq!(all.len(), 16);

        let types: HashSet<String> = all.iter().map(|a| a.item_type().to_string()).collect();
        assert_eq!(types.len(), all.len());
        assert!(types.contains("ec2-instance"));
        assert!(types.contains("elbv2-load-balancer"));
        assert!(types.contains("kms-key"));
        assert!(types.contains("eks-cluster"));
    }

    #[tokio::test]
    async fn test_registry_get_not_found_carries_scope() {
        let scope = Scope::new("123456789012", "us-east-1");
        let all = adapters(Arc::new(NullControlPlane), &scope);
        let vpc = all.iter().find(|a| a.item_type() == "ec2-vpc").unwrap();

        let err = vpc.get(&scope, "vpc-404").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("123456789012.us-east-1"));
    }

    #[test]
    fn test_registry_potential_links_point_at_known_types() {
        let scope = Scope::new("123456789012", "us-east-1");
        let all = adapters(Arc::new(NullControlPlane), &scope);
        let types: HashSet<String> = all.iter().map(|a| a.item_type().to_string()).collect();

        // every declared link either stays in this registry or names a type
        // served elsewhere in the wider graph (iam, acm)
        let external = ["iam-role", "acm-certificate", "ec2-image"];
        for adapter in &all {
            for link in adapter.metadata().potential_links {
                assert!(
                    types.contains(&link) || external.contains(&link.as_str()),
                    "{} links to unknown type {}",
                    adapter.name(),
                    link
                );
            }
        }
    }
}
