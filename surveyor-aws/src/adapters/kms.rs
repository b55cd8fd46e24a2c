//! KMS adapters
//!
//! KMS listings return identifiers only, so both mappers are wired into
//! `AlwaysGetAdapter`s and every listed key or alias is re-fetched.

use serde_json::Value;

use surveyor_core::adapter::ResourceMapper;
use surveyor_core::arn::Arn;
use surveyor_core::error::DiscoveryResult;
use surveyor_core::item::{Health, Item};
use surveyor_core::query::{BlastPropagation, LinkedItemQuery, Query};
use surveyor_core::scope::Scope;

use super::{base_item, str_prop};

// =============================================================================
// Key
// =============================================================================

pub struct KeyMapper;

fn key_health(properties: &Value) -> Option<Health> {
    if let Some(state) = str_prop(properties, "KeyState") {
        return Some(match state {
            "Enabled" => Health::Ok,
            "Disabled" => Health::Warning,
            "Creating" | "PendingImport" => Health::Pending,
            "PendingDeletion" => Health::Error,
            _ => Health::Unknown,
        });
    }
    // older documents only carry the Enabled flag
    properties
        .get("Enabled")
        .and_then(Value::as_bool)
        .map(|enabled| if enabled { Health::Ok } else { Health::Warning })
}

impl ResourceMapper for KeyMapper {
    fn item_type(&self) -> &'static str {
        "kms-key"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::KMS::Key"
    }

    fn unique_attribute(&self) -> &'static str {
        "KeyId"
    }

    fn descriptive_name(&self) -> &'static str {
        "KMS Key"
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        if let Some(health) = key_health(properties) {
            item = item.with_health(health);
        }

        Ok(item)
    }
}

// =============================================================================
// Alias
// =============================================================================

pub struct AliasMapper;

impl ResourceMapper for AliasMapper {
    fn item_type(&self) -> &'static str {
        "kms-alias"
    }

    fn provider_type(&self) -> &'static str {
        "AWS::KMS::Alias"
    }

    fn unique_attribute(&self) -> &'static str {
        "AliasName"
    }

    fn descriptive_name(&self) -> &'static str {
        "KMS Alias"
    }

    fn potential_links(&self) -> Vec<&'static str> {
        vec!["kms-key"]
    }

    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        let mut item = base_item(self.item_type(), self.unique_attribute(), scope, properties)?;

        // the alias is nothing without its key, and re-pointing it changes
        // what every consumer of the alias encrypts with
        if let Some(target_key_id) = str_prop(properties, "TargetKeyId") {
            item = item.link(LinkedItemQuery::new(
                Query::get("kms-key", target_key_id, scope.clone()),
                BlastPropagation::both(),
            ));
        }

        Ok(item)
    }

    /// Alias identifiers keep their `alias/` prefix
    fn search_identifier(&self, arn: &Arn) -> String {
        arn.resource.clone()
    }
}
