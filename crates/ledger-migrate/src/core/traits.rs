//! Remote capabilities consumed by the migration engine.
//!
//! - [`QueryExecutor`]: runs list queries and returns one page per call
//! - [`MutationExecutor`]: runs create/delete mutations, one record per call
//!
//! Implementations live in `drivers/` (GraphQL over HTTP, in-memory). The
//! engine never talks to a transport directly; each call is a single
//! suspension point.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

use super::operation::Operation;

/// One page of a paginated list query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Raw records, in server order.
    pub items: Vec<Value>,
    /// Continuation token. `None` or empty means the collection is exhausted.
    pub next_token: Option<String>,
}

impl Page {
    /// Whether another page follows this one.
    pub fn has_more(&self) -> bool {
        self.next_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Execute list queries against a datastore.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `op` with `variables` (`limit`, `nextToken`, optional `filter`).
    async fn query(&self, op: &Operation, variables: Value) -> Result<Page>;
}

/// Execute mutations against a datastore.
#[async_trait]
pub trait MutationExecutor: Send + Sync {
    /// Run `op` with `variables` (`{ "input": ... }`).
    ///
    /// Returns the created record for creates, or at least `{ "id": ... }`
    /// for deletes.
    async fn mutate(&self, op: &Operation, variables: Value) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more() {
        let mut page = Page::default();
        assert!(!page.has_more());
        page.next_token = Some(String::new());
        assert!(!page.has_more());
        page.next_token = Some("abc".to_string());
        assert!(page.has_more());
    }
}
