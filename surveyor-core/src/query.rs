//! Queries and linked item references

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// How an item is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryMethod {
    /// Lookup by unique attribute value; returns exactly one item
    Get,
    /// Enumerate every item of a type in scope; takes no query string
    List,
    /// Adapter-defined free-form lookup (by default an ARN)
    Search,
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::List => write!(f, "LIST"),
            Self::Search => write!(f, "SEARCH"),
        }
    }
}

/// A question an external engine can put to some adapter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub item_type: String,
    pub method: QueryMethod,
    pub query: String,
    pub scope: Scope,
}

impl Query {
    pub fn new(
        item_type: impl Into<String>,
        method: QueryMethod,
        query: impl Into<String>,
        scope: Scope,
    ) -> Self {
        Self {
            item_type: item_type.into(),
            method,
            query: query.into(),
            scope,
        }
    }

    /// A Get query keyed on the target's unique attribute value
    pub fn get(item_type: impl Into<String>, query: impl Into<String>, scope: Scope) -> Self {
        Self::new(item_type, QueryMethod::Get, query, scope)
    }

    /// A Search query, typically carrying an ARN
    pub fn search(item_type: impl Into<String>, query: impl Into<String>, scope: Scope) -> Self {
        Self::new(item_type, QueryMethod::Search, query, scope)
    }
}

/// Directional impact annotation between two linked items
///
/// `inward`: a change to the link target affects this item.
/// `outward`: a change to this item affects the link target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlastPropagation {
    pub inward: bool,
    pub outward: bool,
}

impl BlastPropagation {
    pub const fn both() -> Self {
        Self {
            inward: true,
            outward: true,
        }
    }

    pub const fn inward_only() -> Self {
        Self {
            inward: true,
            outward: false,
        }
    }

    pub const fn outward_only() -> Self {
        Self {
            inward: false,
            outward: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            inward: false,
            outward: false,
        }
    }
}

/// A directed reference from one item to another
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedItemQuery {
    pub query: Query,
    pub blast_propagation: BlastPropagation,
}

impl LinkedItemQuery {
    pub fn new(query: Query, blast_propagation: BlastPropagation) -> Self {
        Self {
            query,
            blast_propagation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(QueryMethod::Get.to_string(), "GET");
        assert_eq!(QueryMethod::List.to_string(), "LIST");
        assert_eq!(QueryMethod::Search.to_string(), "SEARCH");
    }

    #[test]
    fn test_blast_propagation_constructors() {
        assert_eq!(
            BlastPropagation::both(),
            BlastPropagation {
                inward: true,
                outward: true
            }
        );
        assert_eq!(
            BlastPropagation::inward_only(),
            BlastPropagation {
                inward: true,
                outward: false
            }
        );
        assert_eq!(BlastPropagation::none(), BlastPropagation::default());
    }

    #[test]
    fn test_query_constructors() {
        let scope = Scope::new("123456789012", "us-east-1");
        let q = Query::get("ec2-subnet", "subnet-0abc", scope.clone());
        assert_eq!(q.method, QueryMethod::Get);
        assert_eq!(q.query, "subnet-0abc");
        assert_eq!(q.scope, scope);
    }
}
