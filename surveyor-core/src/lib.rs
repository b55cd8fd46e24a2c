//! Surveyor Core
//!
//! Data model and generic adapter framework for a cloud resource discovery
//! graph: items, scopes, linked item queries, and the harnesses that concrete
//! per-resource-type adapters plug into.

pub mod adapter;
pub mod arn;
pub mod error;
pub mod item;
pub mod provider;
pub mod query;
pub mod scope;

// Re-export main types
pub use adapter::{
    Adapter, AdapterMetadata, AlwaysGetAdapter, DescribeOnlyAdapter, GetListAdapter,
    ResourceMapper,
};
pub use arn::Arn;
pub use error::{DiscoveryError, DiscoveryResult};
pub use item::{Health, Item};
pub use provider::{ControlPlane, NoopCache, QueryCache, ResourceDescription, ResourcePage};
pub use query::{BlastPropagation, LinkedItemQuery, Query, QueryMethod};
pub use scope::Scope;
