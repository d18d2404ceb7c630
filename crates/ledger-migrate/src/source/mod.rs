//! Paginated extraction and the source snapshot.
//!
//! [`fetch_all`] follows continuation tokens until a collection is
//! exhausted. It is used against both datastores: here for the source
//! snapshot, and by `target` to discover rows to delete or verify.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::core::operation::source::{LIST_OWNERS, LIST_PAYMENTS, LIST_UNITS};
use crate::core::{Operation, Owner, Payment, QueryExecutor, Unit};
use crate::error::{MigrateError, Result};

/// Default records per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Fetch an entire collection.
///
/// Pages are requested one at a time starting from an absent token and
/// appended in server order until the returned token is empty. Nothing is
/// de-duplicated. Any query or decode error aborts the whole fetch.
pub async fn fetch_all<T: DeserializeOwned>(
    executor: &dyn QueryExecutor,
    op: &Operation,
    filter: Option<&Value>,
    page_size: usize,
) -> Result<Vec<T>> {
    let mut records = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let mut variables = json!({
            "limit": page_size,
            "nextToken": next_token,
        });
        if let Some(filter) = filter {
            variables["filter"] = filter.clone();
        }

        let page = executor.query(op, variables).await?;
        pages += 1;
        debug!("{}: page {} returned {} items", op, pages, page.items.len());

        let more = page.has_more();
        for item in page.items {
            let record = serde_json::from_value(item).map_err(|e| {
                MigrateError::decode(op.root_field, format!("invalid {} record: {}", op.collection, e))
            })?;
            records.push(record);
        }

        if !more {
            break;
        }
        next_token = page.next_token;
    }

    debug!("{}: fetched {} records in {} pages", op, records.len(), pages);
    Ok(records)
}

/// Immutable copy of the source collections for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub owners: Vec<Owner>,
    pub units: Vec<Unit>,
    pub payments: Vec<Payment>,
}

/// Record counts of a source snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub owners: usize,
    pub units: usize,
    pub payments: usize,
}

impl SourceSnapshot {
    /// Fetch owners, units and payments. All three must succeed.
    pub async fn fetch(executor: &dyn QueryExecutor, page_size: usize) -> Result<Self> {
        let owners = fetch_all(executor, &LIST_OWNERS, None, page_size).await?;
        let units = fetch_all(executor, &LIST_UNITS, None, page_size).await?;
        let payments = fetch_all(executor, &LIST_PAYMENTS, None, page_size).await?;
        Ok(Self {
            owners,
            units,
            payments,
        })
    }

    pub fn counts(&self) -> SourceCounts {
        SourceCounts {
            owners: self.owners.len(),
            units: self.units.len(),
            payments: self.payments.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Page;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves pre-built pages and records the tokens it was called with.
    struct ScriptedPages {
        pages: Vec<Page>,
        calls: Mutex<Vec<Value>>,
        fail_at: Option<usize>,
    }

    impl ScriptedPages {
        fn split(items: Vec<Value>, page_size: usize) -> Self {
            let mut pages: Vec<Page> = items
                .chunks(page_size.max(1))
                .enumerate()
                .map(|(i, chunk)| Page {
                    items: chunk.to_vec(),
                    next_token: Some(format!("token-{}", i + 1)),
                })
                .collect();
            match pages.last_mut() {
                Some(last) => last.next_token = None,
                None => pages.push(Page::default()),
            }
            Self {
                pages,
                calls: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }
    }

    #[async_trait]
    impl QueryExecutor for ScriptedPages {
        async fn query(&self, _op: &Operation, variables: Value) -> Result<Page> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(variables);
            if self.fail_at == Some(index) {
                return Err(MigrateError::remote("listOwners", "throttled"));
            }
            Ok(self.pages[index].clone())
        }
    }

    fn owners(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({"id": format!("o{}", i), "name": format!("Owner {}", i)}))
            .collect()
    }

    #[tokio::test]
    async fn test_returns_concatenation_of_all_pages() {
        for (total, page_size) in [(0, 10), (1, 10), (10, 10), (25, 10), (7, 1)] {
            let exec = ScriptedPages::split(owners(total), page_size);
            let expected_calls = exec.pages.len();

            let fetched: Vec<Owner> = fetch_all(&exec, &LIST_OWNERS, None, page_size)
                .await
                .unwrap();

            let ids: Vec<String> = fetched.iter().map(|o| o.id.clone()).collect();
            let expected: Vec<String> = (0..total).map(|i| format!("o{}", i)).collect();
            assert_eq!(ids, expected, "total={} page_size={}", total, page_size);
            assert_eq!(exec.calls.lock().unwrap().len(), expected_calls);
        }
    }

    #[tokio::test]
    async fn test_follows_tokens_in_order() {
        let exec = ScriptedPages::split(owners(5), 2);
        let _: Vec<Owner> = fetch_all(&exec, &LIST_OWNERS, None, 2).await.unwrap();

        let calls = exec.calls.lock().unwrap();
        assert_eq!(calls[0]["nextToken"], Value::Null);
        assert_eq!(calls[1]["nextToken"], json!("token-1"));
        assert_eq!(calls[2]["nextToken"], json!("token-2"));
        assert!(calls.iter().all(|c| c["limit"] == json!(2)));
        assert!(calls.iter().all(|c| c.get("filter").is_none()));
    }

    #[tokio::test]
    async fn test_empty_token_ends_pagination() {
        let mut exec = ScriptedPages::split(owners(3), 3);
        exec.pages[0].next_token = Some(String::new());
        let fetched: Vec<Owner> = fetch_all(&exec, &LIST_OWNERS, None, 3).await.unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(exec.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicates_are_preserved() {
        let items = vec![json!({"id": "o1"}), json!({"id": "o1"})];
        let exec = ScriptedPages::split(items, 1);
        let fetched: Vec<Owner> = fetch_all(&exec, &LIST_OWNERS, None, 1).await.unwrap();
        assert_eq!(fetched.len(), 2);
    }

    #[tokio::test]
    async fn test_filter_is_forwarded() {
        let exec = ScriptedPages::split(owners(1), 10);
        let filter = json!({"state": {"eq": "SC"}});
        let _: Vec<Owner> = fetch_all(&exec, &LIST_OWNERS, Some(&filter), 10)
            .await
            .unwrap();
        assert_eq!(exec.calls.lock().unwrap()[0]["filter"], filter);
    }

    #[tokio::test]
    async fn test_error_mid_fetch_returns_no_partial_result() {
        let mut exec = ScriptedPages::split(owners(30), 10);
        exec.fail_at = Some(2);
        let result: Result<Vec<Owner>> = fetch_all(&exec, &LIST_OWNERS, None, 10).await;
        assert!(matches!(result, Err(MigrateError::Remote { .. })));
    }

    #[tokio::test]
    async fn test_undecodable_record_fails_fetch() {
        let exec = ScriptedPages::split(vec![json!({"name": "no id"})], 10);
        let result: Result<Vec<Owner>> = fetch_all(&exec, &LIST_OWNERS, None, 10).await;
        assert!(matches!(result, Err(MigrateError::Decode { .. })));
    }
}
