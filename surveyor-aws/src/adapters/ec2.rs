//! EC2 compute and networking adapters
//!
//! All EC2 shapes list with full property documents, so every mapper here is
//! wired into a `DescribeOnlyAdapter`.

use serde_json::Value;

use surveyor_core::adapter::ResourceMapper;
use surveyor_core::arn::Arn;
use surveyor_core::error::DiscoveryResult;
use surveyor_core::item::{Health, Item};
use surveyor_core::query::{BlastPropagation, LinkedItemQuery, Query};
use surveyor_core::scope::Scope;

use super::{base_item, str_list, str_prop};

// =============================================================================
// VPC
// =============================================================================

pub struct VpcMapper;

impl ResourceMapper for VpcMapper {
    fn item_type(&self) -> &'static str {
        "ec2-vpc"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::VPC"
    }

    fn unique_attribute(&self) -> &'static str {
        "VpcId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 VPC"
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        // the graph reaches a VPC from its members, not the other way round
        base_item(self.item_type(), self.unique_attribute(), scope, properties)
    }
}

// =============================================================================
// Subnet
// =============================================================================

pub struct SubnetMapper;

impl ResourceMapper for SubnetMapper {
    fn item_type(&self) -> &'static str {
        "ec2-subnet"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::Subnet"
    }

    fn unique_attribute(&self) -> &'static str {
        "SubnetId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 Subnet"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-vpc"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(vpc_id) = str_prop(properties, "VpcId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-vpc", vpc_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }

        Ok(item)
    }
}

// =============================================================================
// Instance
// =============================================================================

pub struct InstanceMapper;

fn instance_health(state: &str) -> Health {
    match state {
        "running" => Health::Ok,
        "pending" | "stopping" | "shutting-down" => Health::Pending,
        "stopped" => Health::Warning,
        "terminated" => Health::Error,
        _ => Health::Unknown,
    }
}

impl ResourceMapper for InstanceMapper {
    fn item_type(&self) -> &'static str {
        "ec2-instance"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::Instance"
    }

    fn unique_attribute(&self) -> &'static str {
        "InstanceId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 Instance"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec![
            "ec2-subnet",
            "ec2-vpc",
            "ec2-image",
            "ec2-security-group",
            "ec2-volume",
        ]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(state) = properties.pointer("/State/Name").and_then(Value::as_str) {
            item = item.with_health(instance_health(state));
        }

        // the instance depends on its placement and launch inputs
        if let Some(subnet_id) = str_prop(properties, "SubnetId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-subnet", subnet_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }
        if let Some(vpc_id) = str_prop(properties, "VpcId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-vpc", vpc_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }
        if let Some(image_id) = str_prop(properties, "ImageId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-image", image_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }
        for group_id in str_list(properties, "SecurityGroupIds") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-security-group", group_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }

        // attached volumes move with the instance and vice versa
        if let Some(mappings) = properties
            .get("BlockDeviceMappings")
            .and_then(Value::as_array)
        {
            for mapping in mappings {
                if let Some(volume_id) = mapping.pointer("/Ebs/VolumeId").and_then(Value::as_str) {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("ec2-volume", volume_id, scope.clone()),
                        BlastPropagation::both(),
                    ));
                }
            }
        }

        Ok(item)
    }
}

// =============================================================================
// Security group
// =============================================================================

pub struct SecurityGroupMapper;

impl ResourceMapper for SecurityGroupMapper {
    fn item_type(&self) -> &'static str {
        "ec2-security-group"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::SecurityGroup"
    }

    fn unique_attribute(&self) -> &'static str {
        "GroupId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 Security Group"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-vpc", "ec2-security-group"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;
        let own_id = str_prop(properties, "GroupId").unwrap_or_default().to_string();

        if let Some(vpc_id) = str_prop(properties, "VpcId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-vpc", vpc_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }

        // rules referencing another group depend on that group's existence
        if let Some(rules) = properties
            .get("SecurityGroupIngress")
            .and_then(Value::as_array)
        {
            for rule in rules {
                if let Some(source) = rule
                    .get("SourceSecurityGroupId")
                    .and_then(Value::as_str)
                    .filter(|source| *source != own_id)
                {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("ec2-security-group", source, scope.clone()),
                        BlastPropagation::inward_only(),
                    ));
                }
            }
        }

        Ok(item)
    }
}

// =============================================================================
// Internet gateway
// =============================================================================

pub struct InternetGatewayMapper;

impl ResourceMapper for InternetGatewayMapper {
    fn item_type(&self) -> &'static str {
        "ec2-internet-gateway"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::InternetGateway"
    }

    fn unique_attribute(&self) -> &'static str {
        "InternetGatewayId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 Internet Gateway"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-vpc"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        // attachment couples gateway and VPC in both directions
        if let Some(attachments) = properties.get("Attachments").and_then(Value::as_array) {
            for attachment in attachments {
                if let Some(vpc_id) = attachment.get("VpcId").and_then(Value::as_str) {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("ec2-vpc", vpc_id, scope.clone()),
                        BlastPropagation::both(),
                    ));
                }
            }
        }

        Ok(item)
    }
}

// =============================================================================
// NAT gateway
// =============================================================================

pub struct NatGatewayMapper;

fn nat_gateway_health(state: &str) -> Health {
    match state {
        "available" => Health::Ok,
        "pending" | "deleting" => Health::Pending,
        "failed" => Health::Error,
        _ => Health::Unknown,
    }
}

impl ResourceMapper for NatGatewayMapper {
    fn item_type(&self) -> &'static str {
        "ec2-nat-gateway"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::NatGateway"
    }

    fn unique_attribute(&self) -> &'static str {
        "NatGatewayId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 NAT Gateway"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-subnet", "ec2-vpc", "ec2-address"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(state) = str_prop(properties, "State") {
            item = item.with_health(nat_gateway_health(state));
        }

        if let Some(subnet_id) = str_prop(properties, "SubnetId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-subnet", subnet_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }
        if let Some(vpc_id) = str_prop(properties, "VpcId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-vpc", vpc_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }
        // the gateway holds the elastic IP; deleting either side breaks the other
        if let Some(allocation_id) = str_prop(properties, "AllocationId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-address", allocation_id, scope.clone()),
                BlastPropagation::both(),
            ));
        }

        Ok(item)
    }
}

// =============================================================================
// Elastic IP address
// =============================================================================

pub struct AddressMapper;

impl ResourceMapper for AddressMapper {
    fn item_type(&self) -> &'static str {
        "ec2-address"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::EIP"
    }

    fn unique_attribute(&self) -> &'static str {
        "AllocationId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 Elastic IP"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-instance"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(instance_id) = str_prop(properties, "InstanceId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-instance", instance_id, scope.clone()),
                BlastPropagation::both(),
            ));
        }

        Ok(item)
    }
}

// =============================================================================
// Route table
// =============================================================================

pub struct RouteTableMapper;

impl ResourceMapper for RouteTableMapper {
    fn item_type(&self) -> &'static str {
        "ec2-route-table"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::RouteTable"
    }

    fn unique_attribute(&self) -> &'static str {
        "RouteTableId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 Route Table"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec![
            "ec2-vpc",
            "ec2-subnet",
            "ec2-internet-gateway",
            "ec2-nat-gateway",
        ]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(vpc_id) = str_prop(properties, "VpcId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("ec2-vpc", vpc_id, scope.clone()),
                BlastPropagation::inward_only(),
            ));
        }

        // routing changes hit the associated subnets, not the reverse
        if let Some(associations) = properties.get("Associations").and_then(Value::as_array) {
            for association in associations {
                if let Some(subnet_id) = association.get("SubnetId").and_then(Value::as_str) {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("ec2-subnet", subnet_id, scope.clone()),
                        BlastPropagation::outward_only(),
                    ));
                }
            }
        }

        if let Some(routes) = properties.get("Routes").and_then(Value::as_array) {
            for route in routes {
                if let Some(gateway_id) = route.get("GatewayId").and_then(Value::as_str)
                    && gateway_id.starts_with("igw-")
                {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("ec2-internet-gateway", gateway_id, scope.clone()),
                        BlastPropagation::inward_only(),
                    ));
                }
                if let Some(nat_gateway_id) = route.get("NatGatewayId").and_then(Value::as_str) {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("ec2-nat-gateway", nat_gateway_id, scope.clone()),
                        BlastPropagation::inward_only(),
                    ));
                }
            }
        }

        Ok(item)
    }
}

// =============================================================================
// EBS volume
// =============================================================================

pub struct VolumeMapper;

impl ResourceMapper for VolumeMapper {
    fn item_type(&self) -> &'static str {
        "ec2-volume"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::EC2::Volume"
    }

    fn unique_attribute(&self) -> &'static str {
        "VolumeId"
    }

    fn descriptive_name(&self) -> &'static str {
        "EC2 EBS Volume"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["ec2-instance", "kms-key"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(attachments) = properties.get("Attachments").and_then(Value::as_array) {
            for attachment in attachments {
                if let Some(instance_id) = attachment.get("InstanceId").and_then(Value::as_str) {
                    item = item.link(LinkedItemQuery::new(
                        Query::get("ec2-instance", instance_id, scope.clone()),
                        BlastPropagation::both(),
                    ));
                }
            }
        }

        // the key may live in another account; the ARN carries the real scope
        if let Some(kms_key_id) = str_prop(properties, "KmsKeyId")
            && let Ok(arn) = Arn::parse(kms_key_id)
        {
            item = item.link(LinkedItemQuery::new(
                Query::search("kms-key", kms_key_id, arn.scope_or(scope)),
                BlastPropagation::inward_only(),
            ));
        }

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use surveyor_core::query::QueryMethod;

    fn scope() -> Scope {
        Scope::new("123456789012", "us-east-1")
    }

    /// Flatten links into comparable (type, method, query, scope) tuples
    fn link_tuples(item: &Item) -> Vec<(String, QueryMethod, String, String)> {
        item.linked_item_queries
            .iter()
            .map(|link| {
                (
                    link.query.item_type.clone(),
                    link.query.method,
                    link.query.query.clone(),
                    link.query.scope.to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_vpc_mapper() {
        let props = json!({
            "VpcId": "vpc-0a1b2c3d",
            "CidrBlock": "10.0.0.0/16",
            "Tags": [{"Key": "Name", "Value": "main"}],
        });
        let item = VpcMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();
        assert_eq!(item.unique_attribute_value(), Some("vpc-0a1b2c3d"));
        assert_eq!(item.tags.get("Name").map(String::as_str), Some("main"));
        assert!(item.linked_item_queries.is_empty());
    }

    #[test]
    fn test_subnet_links_to_vpc() {
        let props = json!({
            "SubnetId": "subnet-0abc",
            "VpcId": "vpc-0a1b2c3d",
            "CidrBlock": "10.0.1.0/24",
        });
        let item = SubnetMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();
        assert_eq!(
            link_tuples(&item),
            vec![(
                "ec2-vpc".to_string(),
                QueryMethod::Get,
                "vpc-0a1b2c3d".to_string(),
                "123456789012.us-east-1".to_string(),
            )]
        );
        assert_eq!(
            item.linked_item_queries[0].blast_propagation,
            BlastPropagation::inward_only()
        );
    }

    #[test]
    fn test_instance_links_and_health() {
        let props = json!({
            "InstanceId": "i-0abc123",
            "ImageId": "ami-0def456",
            "SubnetId": "subnet-0abc",
            "VpcId": "vpc-0a1b",
            "State": {"Name": "running", "Code": 16},
            "SecurityGroupIds": ["sg-1", "sg-2"],
            "BlockDeviceMappings": [
                {"DeviceName": "/dev/xvda", "Ebs": {"VolumeId": "vol-0aaa"}},
            ],
        });
        let item = InstanceMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();

        assert_eq!(item.health, Some(Health::Ok));
        let tuples = link_tuples(&item);
        assert_eq!(tuples.len(), 6);
        assert!(tuples.contains(&(
            "ec2-subnet".to_string(),
            QueryMethod::Get,
            "subnet-0abc".to_string(),
            "123456789012.us-east-1".to_string(),
        )));
        assert!(tuples.contains(&(
            "ec2-security-group".to_string(),
            QueryMethod::Get,
            "sg-2".to_string(),
            "123456789012.us-east-1".to_string(),
        )));
        assert!(tuples.contains(&(
            "ec2-volume".to_string(),
            QueryMethod::Get,
            "vol-0aaa".to_string(),
            "123456789012.us-east-1".to_string(),
        )));

        // the volume link is the only mutual edge
        let volume_link = item
            .linked_item_queries
            .iter()
            .find(|l| l.query.item_type == "ec2-volume")
            .unwrap();
        assert_eq!(volume_link.blast_propagation, BlastPropagation::both());
    }

    #[test]
    fn test_instance_health_states() {
        assert_eq!(instance_health("running"), Health::Ok);
        assert_eq!(instance_health("pending"), Health::Pending);
        assert_eq!(instance_health("stopped"), Health::Warning);
        assert_eq!(instance_health("terminated"), Health::Error);
        assert_eq!(instance_health("weird"), Health::Unknown);
    }

    #[test]
    fn test_security_group_skips_self_reference() {
        let props = json!({
            "GroupId": "sg-self",
            "VpcId": "vpc-0a1b",
            "SecurityGroupIngress": [
                {"IpProtocol": "tcp", "FromPort": 443, "SourceSecurityGroupId": "sg-peer"},
                {"IpProtocol": "tcp", "FromPort": 5432, "SourceSecurityGroupId": "sg-self"},
                {"IpProtocol": "tcp", "FromPort": 80, "CidrIp": "0.0.0.0/0"},
            ],
        });
        let item = SecurityGroupMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();

        let peers: Vec<_> = item
            .linked_item_queries
            .iter()
            .filter(|l| l.query.item_type == "ec2-security-group")
            .collect();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].query.query, "sg-peer");
    }

    #[test]
    fn test_internet_gateway_attachment_is_mutual() {
        let props = json!({
            "InternetGatewayId": "igw-0abc",
            "Attachments": [{"VpcId": "vpc-0a1b", "State": "available"}],
        });
        let item = InternetGatewayMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();
        assert_eq!(item.linked_item_queries.len(), 1);
        assert_eq!(
            item.linked_item_queries[0].blast_propagation,
            BlastPropagation::both()
        );
    }

    #[test]
    fn test_nat_gateway_links_and_health() {
        let props = json!({
            "NatGatewayId": "nat-0abc",
            "SubnetId": "subnet-0abc",
            "VpcId": "vpc-0a1b",
            "AllocationId": "eipalloc-0a1b",
            "State": "available",
            "ConnectivityType": "public",
        });
        let item = NatGatewayMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();

        assert_eq!(item.health, Some(Health::Ok));
        let tuples = link_tuples(&item);
        assert!(tuples.contains(&(
            "ec2-address".to_string(),
            QueryMethod::Get,
            "eipalloc-0a1b".to_string(),
            "123456789012.us-east-1".to_string(),
        )));
        assert_eq!(nat_gateway_health("failed"), Health::Error);
        assert_eq!(nat_gateway_health("deleting"), Health::Pending);
    }

    #[test]
    fn test_address_links_to_instance() {
        let props = json!({
            "AllocationId": "eipalloc-0a1b",
            "PublicIp": "203.0.113.7",
            "Domain": "vpc",
            "InstanceId": "i-0abc123",
        });
        let item = AddressMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();
        assert_eq!(
            link_tuples(&item),
            vec![(
                "ec2-instance".to_string(),
                QueryMethod::Get,
                "i-0abc123".to_string(),
                "123456789012.us-east-1".to_string(),
            )]
        );
    }

    #[test]
    fn test_route_table_links() {
        let props = json!({
            "RouteTableId": "rtb-0abc",
            "VpcId": "vpc-0a1b",
            "Associations": [
                {"SubnetId": "subnet-0abc", "Main": false},
            ],
            "Routes": [
                {"DestinationCidrBlock": "10.0.0.0/16", "GatewayId": "local"},
                {"DestinationCidrBlock": "0.0.0.0/0", "GatewayId": "igw-0abc"},
                {"DestinationCidrBlock": "192.168.0.0/16", "NatGatewayId": "nat-0abc"},
            ],
        });
        let item = RouteTableMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();

        let tuples = link_tuples(&item);
        assert_eq!(tuples.len(), 4);
        assert!(tuples.contains(&(
            "ec2-internet-gateway".to_string(),
            QueryMethod::Get,
            "igw-0abc".to_string(),
            "123456789012.us-east-1".to_string(),
        )));
        assert!(tuples.contains(&(
            "ec2-nat-gateway".to_string(),
            QueryMethod::Get,
            "nat-0abc".to_string(),
            "123456789012.us-east-1".to_string(),
        )));

        let subnet_link = item
            .linked_item_queries
            .iter()
            .find(|l| l.query.item_type == "ec2-subnet")
            .unwrap();
        assert_eq!(
            subnet_link.blast_propagation,
            BlastPropagation::outward_only()
        );
    }

    #[test]
    fn test_volume_links_cross_scope_kms_key() {
        let props = json!({
            "VolumeId": "vol-0aaa",
            "Encrypted": true,
            "KmsKeyId": "arn:aws:kms:us-east-1:999999999999:key/1234abcd",
            "Attachments": [{"InstanceId": "i-0abc123", "Device": "/dev/xvda"}],
        });
        let item = VolumeMapper.map(&scope(), &props).unwrap();
        item.validate().unwrap();

        let kms_link = item
            .linked_item_queries
            .iter()
            .find(|l| l.query.item_type == "kms-key")
            .unwrap();
        assert_eq!(kms_link.query.method, QueryMethod::Search);
        // the key's own account, not ours
        assert_eq!(kms_link.query.scope.to_string(), "999999999999.us-east-1");
        assert_eq!(kms_link.blast_propagation, BlastPropagation::inward_only());
    }

    #[test]
    fn test_mapper_rejects_non_object_document() {
        assert!(VpcMapper.map(&scope(), &Value::Null).is_err());
        assert!(InstanceMapper.map(&scope(), &json!("nope")).is_err());
    }
}
