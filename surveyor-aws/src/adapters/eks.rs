//! EKS adapters
//!
//! Cluster and nodegroup listings return names only, so both mappers are
//! wired into `AlwaysGetAdapter`s.

use serde_json::Value;

use surveyor_core::adapter::ResourceMapper;
use surveyor_core::arn::Arn;
use surveyor_core::error::DiscoveryResult;
use surveyor_core::item::{Health, Item};
use surveyor_core::query::{BlastPropagation, LinkedItemQuery, Query};
use surveyor_core::scope::Scope;

use super::{base_item, str_list, str_prop};

fn eks_health(status: &str) -> Health {
    match status {
        "ACTIVE" => Health::Ok,
        "CREATING" | "UPDATING" | "DELETING" | "PENDING" => Health::Pending,
        "DEGRADED" => Health::Warning,
        "CREATE_FAILED" | "DELETE_FAILED" | "FAILED" => Health::Error,
        _ => Health::Unknown,
    }
}

// =============================================================================
// Cluster
// =============================================================================

pub struct ClusterMapper;

impl ResourceMapper for ClusterMapper {
    fn item_type(&self) -> &'static str {
        "eks-cluster"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EKS::Cluster"
    }

    fn unique_attribute(&self) -> &'static str {
        "Name"
    }

    fn descriptive_name(&self) -> &'static str {
        "EKS Cluster"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-subnet", "ec2-security-group", "kms-key", "iam-role"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(status) = str_prop(properties, "Status") {
            item = item.with_health(eks_health(status));
        }

        if let Some(vpc_config) = properties.get("ResourcesVpcConfig") {
            for subnet_id in str_list(vpc_config, "SubnetIds") {
                item = item.link(LinkedItemQuery::new(
                    Query::get("ec2-subnet", subnet_id, scope.clone()),
                    BlastPropagation::inward_only(),
                ));
            }
            for group_id in str_list(vpc_config, "SecurityGroupIds") {
                item = item.link(LinkedItemQuery::new(
                    Query::get("ec2-security-group", group_id, scope.clone()),
                    BlastPropagation::inward_only(),
                ));
            }
        }

        // IAM is global; the ARN carries no region, so the link keeps ours
        if let Some(role_arn) = str_prop(properties, "RoleArn")
            && let Ok(arn) = Arn::parse(role_arn)
        {
            item = item.link(LinkedItemQuery::new(
                Query::search("iam-role", role_arn, arn.scope_or(scope)),
                BlastPropagation::inward_only(),
            ));
        }

        if let Some(configs) = properties.get("EncryptionConfig").and_then(Value::as_array) {
            for config in configs {
                if let Some(key_arn) = config.pointer("/Provider/KeyArn").and_then(Value::as_str)
                    && let Ok(arn) = Arn::parse(key_arn)
                {
                    item = item.link(LinkedItemQuery::new(
                        Query::search("kms-key", key_arn, arn.scope_or(scope)),
                        BlastPropagation::inward_only(),
                    ));
                }
            }
        }

        Ok(item)
    }
}

// =============================================================================
// Nodegroup
// =============================================================================

pub struct NodegroupMapper;

impl ResourceMapper for NodegroupMapper {
    fn item_type(&self) -> &'static str {
        "eks-nodegroup"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EKS::Nodegroup"
    }

    fn unique_attribute(&self) -> &'static str {
        "Id"
    }

    fn descriptive_name(&self) -> &'static str {
        "EKS Nodegroup"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["eks-cluster", "ec2-subnet", "iam-role"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(status) = str_prop(properties, "Status") {
            item = item.with_health(eks_health(status));
        }

        // nodes run the cluster's workloads; the coupling is mutual
        if let Some(cluster_name) = str_prop(properties, "ClusterName") {
            item = item.link(LinkedItemQuery::new(
                Query::get("eks-cluster", cluster_name, scope.clone()),
                BlastPropagation::both(),
            ));
        }

        for subnet_id in str_list(properties, "Subnets") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-subnet", subnet_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }

        if let Some(node_role) = str_prop(properties, "NodeRole")
            && let Ok(arn) = Arn::parse(node_role)
        {
            item = item.link(LinkedItemQuery::new(
                Query::search("iam-role", node_role, arn.scope_or(scope)),
                BlastPropagation::inward_only(),
            ));
        }

        Ok(item)
    }
}
