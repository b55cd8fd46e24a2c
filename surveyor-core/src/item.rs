//! Item - normalized resource node in the discovery graph

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::query::LinkedItemQuery;
use crate::scope::Scope;

/// Operational health derived from a provider state or status field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Ok,
    Warning,
    Error,
    Pending,
    Unknown,
}

/// A normalized resource record
///
/// Items are created fresh on every query; there is no persistence and no
/// lifecycle beyond the single request/response mapping call that built them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Resource-kind tag, e.g. "ec2-instance"
    pub item_type: String,
    /// Name of the attribute serving as this item's primary key
    pub unique_attribute: String,
    /// Account+region the item lives in
    pub scope: Scope,
    /// Flattened API response fields
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_item_queries: Vec<LinkedItemQuery>,
}

impl Item {
    pub fn new(
        item_type: impl Into<String>,
        unique_attribute: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            item_type: item_type.into(),
            unique_attribute: unique_attribute.into(),
            scope,
            attributes: Map::new(),
            tags: BTreeMap::new(),
            health: None,
            linked_item_queries: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    /// Append one linked item query
    pub fn link(mut self, link: LinkedItemQuery) -> Self {
        self.linked_item_queries.push(link);
        self
    }

    /// Value of the primary-key attribute, if present and a string
    pub fn unique_attribute_value(&self) -> Option<&str> {
        self.attributes
            .get(&self.unique_attribute)
            .and_then(Value::as_str)
    }

    /// Globally unique name: `"{scope}+{type}+{unique attribute value}"`
    pub fn globally_unique_name(&self) -> String {
        format!(
            "{}+{}+{}",
            self.scope,
            self.item_type,
            self.unique_attribute_value().unwrap_or_default()
        )
    }

    /// Schema validation applied to every item an adapter emits
    pub fn validate(&self) -> DiscoveryResult<()> {
        if self.item_type.is_empty() {
            return Err(DiscoveryError::mapping("<unknown>", "item type is empty"));
        }
        if self.scope.account_id.is_empty() || self.scope.region.is_empty() {
            return Err(DiscoveryError::mapping(
                &self.item_type,
                format!("scope {} has an empty segment", self.scope),
            ));
        }
        match self.unique_attribute_value() {
            Some(value) if !value.is_empty() => {}
            _ => {
                return Err(DiscoveryError::mapping(
                    &self.item_type,
                    format!(
                        "unique attribute {:?} is missing or not a non-empty string",
                        self.unique_attribute
                    ),
                ));
            }
        }
        for link in &self.linked_item_queries {
            if link.query.item_type.is_empty() || link.query.query.is_empty() {
                return Err(DiscoveryError::mapping(
                    &self.item_type,
                    "linked item query has an empty type or query",
                ));
            }
            if link.query.scope.account_id.is_empty() || link.query.scope.region.is_empty() {
                return Err(DiscoveryError::mapping(
                    &self.item_type,
                    format!("linked item query scope {} is incomplete", link.query.scope),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BlastPropagation, Query};
    use serde_json::json;

    fn test_item() -> Item {
        let mut attributes = Map::new();
        attributes.insert("VpcId".to_string(), json!("vpc-0a1b2c3d"));
        attributes.insert("CidrBlock".to_string(), json!("10.0.0.0/16"));
        Item::new("ec2-vpc", "VpcId", Scope::new("123456789012", "us-east-1"))
            .with_attributes(attributes)
    }

    #[test]
    fn test_unique_attribute_value() {
        assert_eq!(test_item().unique_attribute_value(), Some("vpc-0a1b2c3d"));
    }

    #[test]
    fn test_globally_unique_name() {
        assert_eq!(
            test_item().globally_unique_name(),
            "123456789012.us-east-1+ec2-vpc+vpc-0a1b2c3d"
        );
    }

    #[test]
    fn test_validate_accepts_complete_item() {
        let item = test_item().link(LinkedItemQuery::new(
            Query::get(
                "ec2-subnet",
                "subnet-0abc",
                Scope::new("123456789012", "us-east-1"),
            ),
            BlastPropagation::inward_only(),
        ));
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_unique_attribute() {
        let item = Item::new("ec2-vpc", "VpcId", Scope::new("123456789012", "us-east-1"));
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_link_query() {
        let item = test_item().link(LinkedItemQuery::new(
            Query::get("ec2-subnet", "", Scope::new("123456789012", "us-east-1")),
            BlastPropagation::none(),
        ));
        assert!(item.validate().is_err());
    }
}
