//! Surveyor AWS
//!
//! AWS control-plane adapters: every supported resource type gets a mapper
//! that turns a Cloud Control property document into a normalized item with
//! linked item queries.
//!
//! ## Module Structure
//!
//! - `adapters` - Per-resource-type mappers and the adapter registry
//! - `control` - Cloud Control backed implementation of `ControlPlane`
//! - `tags` - CloudFormation tag array conversion
//! - `validate` - Account and region input validation

pub mod adapters;
pub mod control;
pub mod tags;
pub mod validate;

// Re-export main entry points
pub use adapters::adapters;
pub use control::CloudControl;
pub use validate::{validate_account_id, validate_region};
