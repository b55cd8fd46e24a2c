//! Adapter contract and the generic harnesses concrete adapters plug into
//!
//! A concrete adapter is a [`ResourceMapper`] (the per-resource-type mapping
//! rules) plugged into one of three harnesses, each matching a provider API
//! shape:
//!
//! - [`DescribeOnlyAdapter`] - one describe endpoint serves Get and List, and
//!   list pages carry full property documents.
//! - [`AlwaysGetAdapter`] - the list endpoint returns identifiers only, so
//!   every listed identifier is re-fetched through Get before mapping.
//! - [`GetListAdapter`] - list rows are summary-shaped and go through the
//!   mapper's `map_list` hook instead of `map`.
//!
//! All three share the same Search contract: parse the query as an ARN, check
//! its account/region against the adapter's bound scope, then Get by the
//! extracted resource id. Mappers whose identifiers are not ARN-addressable
//! can opt out of Search entirely.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::arn::Arn;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::item::Item;
use crate::provider::{ControlPlane, NoopCache, QueryCache, ResourceDescription};
use crate::query::QueryMethod;
use crate::scope::Scope;

/// Adapter facts consumed by an external discovery planner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterMetadata {
    pub item_type: String,
    pub descriptive_name: String,
    pub supported_methods: Vec<QueryMethod>,
    /// Item types this adapter may emit links to
    pub potential_links: Vec<String>,
}

/// Per-resource-type unit translating provider API calls into items
#[async_trait]
pub trait Adapter: Send + Sync {
    fn name(&self) -> String;
    fn item_type(&self) -> &str;
    /// The scope this adapter is bound to
    fn scope(&self) -> &Scope;
    fn metadata(&self) -> AdapterMetadata;

    /// Fetch exactly one item by its unique attribute value
    async fn get(&self, scope: &Scope, query: &str) -> DiscoveryResult<Item>;

    /// Fetch every item of this type in scope
    async fn list(&self, scope: &Scope) -> DiscoveryResult<Vec<Item>>;

    /// Adapter-defined lookup; by default an ARN search
    async fn search(&self, scope: &Scope, query: &str) -> DiscoveryResult<Vec<Item>>;
}

/// The per-resource-type plug for the generic harnesses
pub trait ResourceMapper: Send + Sync {
    /// Graph type tag, e.g. "ec2-instance"
    fn item_type(&self) -> &'static str;

    /// Type name the provider control plane understands, e.g. "AWS::EC2::Instance"
    fn provider_type(&self) -> &'static str;

    /// Attribute serving as the item's primary key, e.g. "InstanceId"
    fn unique_attribute(&self) -> &'static str;

    fn descriptive_name(&self) -> &'static str {
        self.item_type()
    }

    /// Item types this mapper may emit links to
    fn potential_links(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Map one full property document into an item
    fn map(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item>;

    /// Map one summary-shaped list row; defaults to the full mapper
    fn map_list(&self, scope: &Scope, properties: &Value) -> DiscoveryResult<Item> {
        self.map(scope, properties)
    }

    /// Whether this type's identifiers are reachable through the ARN search
    /// path; opting out makes Search fail with `NotSupported`
    fn supports_search(&self) -> bool {
        true
    }

    /// Turn a searched ARN into a Get identifier; defaults to the ARN's
    /// trailing resource id
    fn search_identifier(&self, arn: &Arn) -> String {
        arn.resource_id().to_string()
    }
}

/// Shared plumbing behind the three harnesses
struct Harness<M: ResourceMapper> {
    mapper: M,
    control: Arc<dyn ControlPlane>,
    cache: Box<dyn QueryCache>,
    scope: Scope,
}

impl<M: ResourceMapper> Harness<M> {
    fn new(mapper: M, control: Arc<dyn ControlPlane>, scope: Scope) -> Self {
        Self {
            mapper,
            control,
            cache: Box::new(NoopCache),
            scope,
        }
    }

    fn name(&self) -> String {
        format!("{}-adapter", self.mapper.item_type())
    }

    fn metadata(&self) -> AdapterMetadata {
        let mut supported_methods = vec![QueryMethod::Get, QueryMethod::List];
        if self.mapper.supports_search() {
            supported_methods.push(QueryMethod::Search);
        }
        AdapterMetadata {
            item_type: self.mapper.item_type().to_string(),
            descriptive_name: self.mapper.descriptive_name().to_string(),
            supported_methods,
            potential_links: self
                .mapper
                .potential_links()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    fn check_scope(&self, requested: &Scope) -> DiscoveryResult<()> {
        if requested != &self.scope {
            return Err(DiscoveryError::wrong_scope(requested, &self.scope));
        }
        Ok(())
    }

    /// Get one resource description, consulting the cache first
    async fn fetch(&self, identifier: &str) -> DiscoveryResult<ResourceDescription> {
        let type_name = self.mapper.provider_type();

        if let Some(hit) = self.cache.lookup(type_name, identifier) {
            return Ok(hit);
        }

        debug!(type_name, identifier, "fetching resource");
        let description = self
            .control
            .get(type_name, identifier)
            .await?
            .ok_or_else(|| {
                DiscoveryError::not_found(self.mapper.item_type(), identifier, &self.scope)
            })?;

        self.cache.store(type_name, identifier, &description);
        Ok(description)
    }

    fn finish(&self, item: Item) -> DiscoveryResult<Item> {
        item.validate()?;
        Ok(item)
    }

    async fn get_item(&self, identifier: &str) -> DiscoveryResult<Item> {
        let description = self.fetch(identifier).await?;
        let item = self.mapper.map(&self.scope, &description.properties)?;
        self.finish(item)
    }

    /// Drain every page of the provider listing
    async fn descriptions(&self) -> DiscoveryResult<Vec<ResourceDescription>> {
        let type_name = self.mapper.provider_type();
        let mut all = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.control.list_page(type_name, token.as_deref()).await?;
            debug!(type_name, count = page.resources.len(), "listed page");
            all.extend(page.resources);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        Ok(all)
    }

    async fn search_items(&self, query: &str) -> DiscoveryResult<Vec<Item>> {
        if !self.mapper.supports_search() {
            return Err(DiscoveryError::not_supported(
                QueryMethod::Search,
                self.name(),
            ));
        }
        let arn = Arn::parse(query)?;

        let target = arn.scope_or(&self.scope);
        if target != self.scope {
            return Err(DiscoveryError::wrong_scope(&target, &self.scope));
        }

        let identifier = self.mapper.search_identifier(&arn);
        match self.get_item(&identifier).await {
            Ok(item) => Ok(vec![item]),
            // Search returns zero or more; an absent target is not an error
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

/// Harness for types whose describe endpoint serves both Get and List with
/// full property documents
pub struct DescribeOnlyAdapter<M: ResourceMapper> {
    inner: Harness<M>,
}

impl<M: ResourceMapper> DescribeOnlyAdapter<M> {
    pub fn new(mapper: M, control: Arc<dyn ControlPlane>, scope: Scope) -> Self {
        Self {
            inner: Harness::new(mapper, control, scope),
        }
    }

    pub fn with_cache(mut self, cache: Box<dyn QueryCache>) -> Self {
        self.inner.cache = cache;
        self
    }
}

#[async_trait]
impl<M: ResourceMapper> Adapter for DescribeOnlyAdapter<M> {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn item_type(&self) -> &str {
        self.inner.mapper.item_type()
    }

    fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    fn metadata(&self) -> AdapterMetadata {
        self.inner.metadata()
    }

    async fn get(&self, scope: &Scope, query: &str) -> DiscoveryResult<Item> {
        self.inner.check_scope(scope)?;
        self.inner.get_item(query).await
    }

    async fn search(&self, scope: &Scope, query: &str) -> DiscoveryResult<Vec<Item>> {
        self.inner.check_scope(scope)?;
        self.inner.search_items(query).await
    }

    async fn list(&self, scope: &Scope) -> DiscoveryResult<Vec<Item>> {
        self.inner.check_scope(scope)?;
        let mut items = Vec::new();
        for description in self.inner.descriptions().await? {
            let item = self
                .inner
                .mapper
                .map(&self.inner.scope, &description.properties)?;
            items.push(self.inner.finish(item)?);
        }
        Ok(items)
    }
}

/// Harness for types whose list endpoint returns identifiers only
pub struct AlwaysGetAdapter<M: ResourceMapper> {
    inner: Harness<M>,
}

impl<M: ResourceMapper> AlwaysGetAdapter<M> {
    pub fn new(mapper: M, control: Arc<dyn ControlPlane>, scope: Scope) -> Self {
        Self {
            inner: Harness::new(mapper, control, scope),
        }
    }

    pub fn with_cache(mut self, cache: Box<dyn QueryCache>) -> Self {
        self.inner.cache = cache;
        self
    }
}

#[async_trait]
impl<M: ResourceMapper> Adapter for AlwaysGetAdapter<M> {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn item_type(&self) -> &str {
        self.inner.mapper.item_type()
    }

    fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    fn metadata(&self) -> AdapterMetadata {
        self.inner.metadata()
    }

    async fn get(&self, scope: &Scope, query: &str) -> DiscoveryResult<Item> {
        self.inner.check_scope(scope)?;
        self.inner.get_item(query).await
    }

    async fn search(&self, scope: &Scope, query: &str) -> DiscoveryResult<Vec<Item>> {
        self.inner.check_scope(scope)?;
        self.inner.search_items(query).await
    }

    async fn list(&self, scope: &Scope) -> DiscoveryResult<Vec<Item>> {
        self.inner.check_scope(scope)?;
        let mut items = Vec::new();
        for description in self.inner.descriptions().await? {
            items.push(self.inner.get_item(&description.identifier).await?);
        }
        Ok(items)
    }
}

/// Harness for types whose list rows are summary-shaped
pub struct GetListAdapter<M: ResourceMapper> {
    inner: Harness<M>,
}

impl<M: ResourceMapper> GetListAdapter<M> {
    pub fn new(mapper: M, control: Arc<dyn ControlPlane>, scope: Scope) -> Self {
        Self {
            inner: Harness::new(mapper, control, scope),
        }
    }

    pub fn with_cache(mut self, cache: Box<dyn QueryCache>) -> Self {
        self.inner.cache = cache;
        self
    }
}

#[async_trait]
impl<M: ResourceMapper> Adapter for GetListAdapter<M> {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn item_type(&self) -> &str {
        self.inner.mapper.item_type()
    }

    fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    fn metadata(&self) -> AdapterMetadata {
        self.inner.metadata()
    }

    async fn get(&self, scope: &Scope, query: &str) -> DiscoveryResult<Item> {
        self.inner.check_scope(scope)?;
        self.inner.get_item(query).await
    }

    async fn search(&self, scope: &Scope, query: &str) -> DiscoveryResult<Vec<Item>> {
        self.inner.check_scope(scope)?;
        self.inner.search_items(query).await
    }

    async fn list(&self, scope: &Scope) -> DiscoveryResult<Vec<Item>> {
        self.inner.check_scope(scope)?;
        let mut items = Vec::new();
        for description in self.inner.descriptions().await? {
            let item = self
                .inner
                .mapper
                .map_list(&self.inner.scope, &description.properties)?;
            items.push(self.inner.finish(item)?);
        }
        Ok(items)
    }
}
