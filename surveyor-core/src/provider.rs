//! Control-plane abstraction driven by the adapter harnesses
//!
//! The vendor SDK and its pagination primitives sit behind this seam; the
//! harnesses only ever see identifiers, property documents and page tokens.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DiscoveryResult;

/// A single resource as the provider describes it
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescription {
    pub identifier: String,
    /// Property document; `Value::Null` when the listing omitted properties
    pub properties: Value,
}

impl ResourceDescription {
    pub fn new(identifier: impl Into<String>, properties: Value) -> Self {
        Self {
            identifier: identifier.into(),
            properties,
        }
    }

    /// True when the provider returned an identifier but no property document
    pub fn is_summary(&self) -> bool {
        self.properties.is_null()
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, Default)]
pub struct ResourcePage {
    pub resources: Vec<ResourceDescription>,
    pub next_token: Option<String>,
}

/// A provider control-plane API, one uniform get/list surface per type name
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Fetch one resource by identifier. `Ok(None)` when it does not exist.
    async fn get(
        &self,
        type_name: &str,
        identifier: &str,
    ) -> DiscoveryResult<Option<ResourceDescription>>;

    /// Fetch one page of resources of a type
    async fn list_page(
        &self,
        type_name: &str,
        next_token: Option<&str>,
    ) -> DiscoveryResult<ResourcePage>;
}

/// Cache hook consulted before a Get hits the provider
///
/// The default implementation caches nothing; a real cache is an external
/// concern and plugs in through the same trait.
pub trait QueryCache: Send + Sync {
    fn lookup(&self, type_name: &str, identifier: &str) -> Option<ResourceDescription>;
    fn store(&self, type_name: &str, identifier: &str, description: &ResourceDescription);
}

/// Cache that never hits and never stores
pub struct NoopCache;

impl QueryCache for NoopCache {
    fn lookup(&self, _type_name: &str, _identifier: &str) -> Option<ResourceDescription> {
        None
    }

    fn store(&self, _type_name: &str, _identifier: &str, _description: &ResourceDescription) {}
}
