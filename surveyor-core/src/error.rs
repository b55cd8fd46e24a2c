//! Query error types

use thiserror::Error;

use crate::query::QueryMethod;
use crate::scope::Scope;

/// Errors surfaced by adapters and the control-plane layer
///
/// No retries or recovery happen here; callers get a typed error with the
/// scope the failure occurred in and decide what to do with it.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A Get query matched nothing
    #[error("{item_type} {query:?} not found in scope {scope}")]
    NotFound {
        item_type: String,
        query: String,
        scope: String,
    },

    /// The requested scope is not the one this adapter is bound to
    #[error("requested scope {requested} does not match adapter scope {adapter}")]
    WrongScope { requested: String, adapter: String },

    /// The adapter does not implement the requested query method
    #[error("{method} is not supported by {adapter}")]
    NotSupported { method: QueryMethod, adapter: String },

    /// The query string could not be understood (bad ARN, bad scope, ...)
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The provider API call failed
    #[error("provider error in scope {scope}: {message}")]
    Provider { scope: String, message: String },

    /// The API response could not be translated into an item
    #[error("mapping error for {item_type}: {message}")]
    Mapping { item_type: String, message: String },
}

impl DiscoveryError {
    pub fn not_found(
        item_type: impl Into<String>,
        query: impl Into<String>,
        scope: &Scope,
    ) -> Self {
        Self::NotFound {
            item_type: item_type.into(),
            query: query.into(),
            scope: scope.to_string(),
        }
    }

    pub fn wrong_scope(requested: &Scope, adapter: &Scope) -> Self {
        Self::WrongScope {
            requested: requested.to_string(),
            adapter: adapter.to_string(),
        }
    }

    pub fn not_supported(method: QueryMethod, adapter: impl Into<String>) -> Self {
        Self::NotSupported {
            method,
            adapter: adapter.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    pub fn provider(scope: &Scope, message: impl Into<String>) -> Self {
        Self::Provider {
            scope: scope.to_string(),
            message: message.into(),
        }
    }

    pub fn mapping(item_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mapping {
            item_type: item_type.into(),
            message: message.into(),
        }
    }

    /// True when the error just means the item does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_scope() {
        let scope = Scope::new("123456789012", "us-east-1");
        let err = DiscoveryError::not_found("ec2-vpc", "vpc-0a1b2c", &scope);
        assert!(err.is_not_found());
        assert!(err.to_string().contains("123456789012.us-east-1"));
        assert!(err.to_string().contains("vpc-0a1b2c"));
    }

    #[test]
    fn test_wrong_scope_message() {
        let requested = Scope::new("999999999999", "us-east-1");
        let adapter = Scope::new("123456789012", "us-east-1");
        let err = DiscoveryError::wrong_scope(&requested, &adapter);
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "requested scope 999999999999.us-east-1 does not match adapter scope 123456789012.us-east-1"
        );
    }
}
