//! Elastic Load Balancing v2 adapters
//!
//! ELBv2 identifiers are full ARNs, and list rows only carry identity
//! columns, so these mappers override both `search_identifier` (the whole ARN
//! is the Get key) and `map_list` (summary rows get no health or linkage).
//! They are wired into `GetListAdapter`s.

use serde_json::Value;

use surveyor_core::adapter::ResourceMapper;
use surveyor_core::arn::Arn;
use surveyor_core::error::DiscoveryResult;
use surveyor_core::item::{Health, Item};
use surveyor_core::query::{BlastPropagation, LinkedItemQuery, Query};
use surveyor_core::scope::Scope;

use super::{base_item, str_list, str_prop};

fn load_balancer_health(code: &str) -> Health {
    match code {
        "active" => Health::Ok,
        "provisioning" => Health::Pending,
        "active_impaired" => Health::Warning,
        "failed" => Health::Error,
        _ => Health::Unknown,
    }
}

// =============================================================================
// Load balancer
// =============================================================================

pub struct LoadBalancerMapper;

impl ResourceMapper for LoadBalancerMapper {
    fn item_type(&self) -> &'static str {
        "elbv2-load-balancer"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::ElasticLoadBalancingV2::LoadBalancer"
    }

    fn unique_attribute(&self) -> &'static str {
        "LoadBalancerArn"
    }

    fn descriptive_name(&self) -> &'static str {
        "ELBv2 Load Balancer"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-vpc", "ec2-subnet", "ec2-security-group"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(code) = properties.pointer("/State/Code").and_then(Value::as_str) {
            item = item.with_health(load_balancer_health(code));
        }

        if let Some(vpc_id) = str_prop(properties, "VpcId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-vpc", vpc_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }
        for subnet_id in str_list(properties, "Subnets") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-subnet", subnet_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }
        for group_id in str_list(properties, "SecurityGroups") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-security-group", group_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }

        Ok(item)
    }

    fn map_list(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        // summary rows: identity columns only
        base_item(self.item_type(), self.unique_attribute(), scope, properties)
    }

    fn search_identifier(&self, arn: &Arn) -> String {
        arn.to_string()
    }
}

// =============================================================================
// Target group
// =============================================================================

pub struct TargetGroupMapper;

impl ResourceMapper for TargetGroupMapper {
    fn item_type(&self) -> &'static str {
        "elbv2-target-group"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::ElasticLoadBalancingV2::TargetGroup"
    }

    fn unique_attribute(&self) -> &'static str {
        "TargetGroupArn"
    }

    fn descriptive_name(&self) -> &'static str {
        "ELBv2 Target Group"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-vpc", "elbv2-load-balancer"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(vpc_id) = str_prop(properties, "VpcId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-vpc", vpc_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }

        // routing flows both ways between a group and its load balancers
        for load_balancer_arn in str_list(properties, "LoadBalancerArns") {
            item = item.link(LinkedItemQuery::new(
                Query::get("elbv2-load-balancer", load_balancer_arn, scope.clone()),
                BlastPropagation::both(),
            ));
        }

        Ok(item)
    }

    fn map_list(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        base_item(self.item_type(), self.unique_attribute(), scope, properties)
    }

    fn search_identifier(&self, arn: &Arn) -> String {
        arn.to_string()
    }
}

// =============================================================================
// Listener
// =============================================================================

pub struct ListenerMapper;

impl ResourceMapper for ListenerMapper {
    fn item_type(&self) -> &'static str {
        "elbv2-listener"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::ElasticLoadBalancingV2::Listener"
    }

    fn unique_attribute(&self) -> &'static str {
        "ListenerArn"
    }

    fn descriptive_name(&self) -> &'static str {
        "ELBv2 Listener"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["elbv2-load-balancer", "elbv2-target-group", "acm-certificate"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(load_balancer_arn) = str_prop(properties, "LoadBalancerArn") {
            item = item.link(LinkedItemQuery::new(
                Query::get("elbv2-load-balancer", load_balancer_arn, scope.clone()),
                BlastPropagation::both(),
            ));
        }

        if let Some(actions) = properties.get("DefaultActions").and_then(Value::as_array) {
            for action in actions {
                if let Some(target_group_arn) =
                    action.get("TargetGroupArn").and_then(Value::as_str)
                {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("elbv2-target-group", target_group_arn, scope.clone()),
                        BlastPropagation::both(),
                    ));
                }
            }
        }

        // certificates are managed elsewhere and may live in another account
        if let Some(certificates) = properties.get("Certificates").and_then(Value::as_array) {
            for certificate in certificates {
                if let Some(certificate_arn) =
                    certificate.get("CertificateArn").and_then(Value::as_str)
                    && let Ok(arn) = Arn::parse(certificate_arn)
                {
                    item = item.link(LinkedItemQuery::new(
                        Query::search("acm-certificate", certificate_arn, arn.scope_or(scope)),
                        BlastPropagation::inward_only(),
                    ));
                }
            }
        }

        Ok(item)
    }

    fn map_list(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        base_item(self.item_type(), self.unique_attribute(), scope, properties)
    }

    fn search_identifier(&self, arn: &Arn) -> String {
        arn.to_string()
    }
}
