//! In-process datastore.
//!
//! Implements both capabilities over named collections of JSON records.
//! Pages are served by offset tokens, created records get a fresh uuid,
//! and every call is logged. Failures can be injected per operation or per
//! input value, which lets tests exercise the error paths of the engine.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::core::{MutationExecutor, Operation, OperationKind, Page, QueryExecutor};
use crate::error::{MigrateError, Result};

/// One logged call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Root field of the operation (`deletePayment`).
    pub operation: String,
    pub variables: Value,
}

#[derive(Debug, Clone)]
struct InputFailure {
    operation: String,
    field: String,
    value: Value,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Value>>,
    calls: Vec<Call>,
    failing_queries: Vec<String>,
    failing_inputs: Vec<InputFailure>,
}

/// In-memory datastore.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to a collection. Records without an `id` get one.
    pub fn seed(&self, collection: &str, records: impl IntoIterator<Item = Value>) {
        let mut inner = self.lock();
        let rows = inner.collections.entry(collection.to_string()).or_default();
        for mut record in records {
            if record.get("id").is_none() {
                record["id"] = json!(new_id());
            }
            rows.push(record);
        }
    }

    /// Current contents of a collection.
    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrite fields of the record with `id`. Returns false if absent.
    pub fn patch(&self, collection: &str, id: &str, fields: Value) -> bool {
        let mut inner = self.lock();
        let record = inner
            .collections
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|r| r.get("id").and_then(Value::as_str) == Some(id)));
        match (record, fields) {
            (Some(Value::Object(record)), Value::Object(fields)) => {
                record.extend(fields);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self, collection: &str) -> usize {
        self.lock().collections.get(collection).map_or(0, Vec::len)
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Root fields of the mutations made so far, in order.
    pub fn mutation_log(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter(|c| !c.operation.starts_with("list"))
            .map(|c| c.operation.clone())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make every query of `root_field` fail.
    pub fn fail_queries(&self, root_field: &str) {
        self.lock().failing_queries.push(root_field.to_string());
    }

    /// Make mutations of `root_field` fail when `input[field] == value`.
    pub fn fail_input(&self, root_field: &str, field: &str, value: Value) {
        self.lock().failing_inputs.push(InputFailure {
            operation: root_field.to_string(),
            field: field.to_string(),
            value,
        });
    }

    /// Remove injected failures.
    pub fn heal(&self) {
        let mut inner = self.lock();
        inner.failing_queries.clear();
        inner.failing_inputs.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning is ignored.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn matches_filter(record: &Value, filter: Option<&Value>) -> bool {
    let Some(Value::Object(conditions)) = filter else {
        return true;
    };
    conditions.iter().all(|(field, condition)| match condition.get("eq") {
        Some(expected) => record.get(field) == Some(expected),
        None => true,
    })
}

#[async_trait]
impl QueryExecutor for MemoryStore {
    async fn query(&self, op: &Operation, variables: Value) -> Result<Page> {
        let mut inner = self.lock();
        inner.calls.push(Call {
            operation: op.root_field.to_string(),
            variables: variables.clone(),
        });

        if op.kind != OperationKind::List {
            return Err(MigrateError::remote(op.root_field, "not a list operation"));
        }
        if inner.failing_queries.iter().any(|f| f == op.root_field) {
            return Err(MigrateError::remote(op.root_field, "injected query failure"));
        }

        let offset = match variables.get("nextToken").and_then(Value::as_str) {
            Some(token) => token.parse::<usize>().map_err(|_| {
                MigrateError::remote(op.root_field, format!("invalid nextToken {}", token))
            })?,
            None => 0,
        };
        let limit = variables
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(usize::MAX, |l| l.max(1) as usize);

        let matching: Vec<&Value> = inner
            .collections
            .get(op.collection)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_filter(r, variables.get("filter")))
                    .collect()
            })
            .unwrap_or_default();

        let end = offset.saturating_add(limit).min(matching.len());
        let items = matching
            .get(offset.min(end)..end)
            .unwrap_or_default()
            .iter()
            .map(|r| (*r).clone())
            .collect();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(Page { items, next_token })
    }
}

#[async_trait]
impl MutationExecutor for MemoryStore {
    async fn mutate(&self, op: &Operation, variables: Value) -> Result<Value> {
        let mut inner = self.lock();
        inner.calls.push(Call {
            operation: op.root_field.to_string(),
            variables: variables.clone(),
        });

        let input = match variables.get("input") {
            Some(Value::Object(input)) => input.clone(),
            _ => return Err(MigrateError::remote(op.root_field, "missing input")),
        };

        let rejected = inner.failing_inputs.iter().any(|f| {
            f.operation == op.root_field && input.get(&f.field) == Some(&f.value)
        });
        if rejected {
            return Err(MigrateError::remote(op.root_field, "injected mutation failure"));
        }

        let rows = inner
            .collections
            .entry(op.collection.to_string())
            .or_default();

        match op.kind {
            OperationKind::Create => {
                let mut record = Map::new();
                record.insert("id".to_string(), json!(new_id()));
                record.extend(input);
                let record = Value::Object(record);
                rows.push(record.clone());
                Ok(record)
            }
            OperationKind::Delete => {
                let id = input.get("id").cloned().unwrap_or(Value::Null);
                match rows.iter().position(|r| r.get("id") == Some(&id)) {
                    Some(index) => Ok(rows.remove(index)),
                    None => Err(MigrateError::remote(
                        op.root_field,
                        format!("no record with id {}", id),
                    )),
                }
            }
            OperationKind::List => Err(MigrateError::remote(op.root_field, "not a mutation")),
        }
    }
}
