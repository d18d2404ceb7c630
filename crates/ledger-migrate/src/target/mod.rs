//! Target snapshot and bulk writes.
//!
//! The [`BulkWriter`] issues one mutation per entity, strictly in input
//! order. An item that fails is logged with its natural key and counted;
//! the rest of the batch still runs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::core::operation::target::{
    DELETE_PAYMENT, DELETE_PROFILE, DELETE_PROPERTY, LIST_PAYMENTS, LIST_PROFILES, LIST_PROPERTIES,
};
use crate::core::{MutationExecutor, Operation, Payment, Profile, Property, QueryExecutor};
use crate::error::{MigrateError, Result};
use crate::progress::Progress;
use crate::source::fetch_all;

/// Current contents of the target datastore.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub profiles: Vec<Profile>,
    pub properties: Vec<Property>,
    pub payments: Vec<Payment>,
}

impl TargetSnapshot {
    /// Fetch profiles, properties and payments. All three must succeed.
    pub async fn fetch(executor: &dyn QueryExecutor, page_size: usize) -> Result<Self> {
        let profiles = fetch_all(executor, &LIST_PROFILES, None, page_size).await?;
        let properties = fetch_all(executor, &LIST_PROPERTIES, None, page_size).await?;
        let payments = fetch_all(executor, &LIST_PAYMENTS, None, page_size).await?;
        Ok(Self {
            profiles,
            properties,
            payments,
        })
    }
}

/// One entity to create.
#[derive(Debug, Clone)]
pub struct WriteItem<T> {
    /// Source id the created record will be mapped from.
    pub source_id: String,
    /// Name, unit number or check number, for messages.
    pub natural_key: String,
    pub input: T,
}

/// Source id → created target id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMapping {
    pub source_id: String,
    pub target_id: String,
}

/// An item the remote rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    pub natural_key: String,
    pub message: String,
}

/// Outcome of a batch of creates or deletes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteReport {
    pub attempted: usize,
    /// Successful creates (empty for deletes).
    pub mappings: Vec<IdMapping>,
    pub succeeded: usize,
    pub failures: Vec<ItemFailure>,
}

impl WriteReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Outcome of clearing the target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearReport {
    pub payments: WriteReport,
    pub properties: WriteReport,
    pub profiles: WriteReport,
}

impl ClearReport {
    pub fn deleted(&self) -> usize {
        self.payments.succeeded + self.properties.succeeded + self.profiles.succeeded
    }

    pub fn failed(&self) -> usize {
        self.payments.failed() + self.properties.failed() + self.profiles.failed()
    }
}

/// A row to delete.
#[derive(Debug, Clone)]
pub struct DeleteItem {
    pub id: String,
    pub natural_key: String,
}

/// Sequential create/delete issuer.
pub struct BulkWriter {
    mutation: Arc<dyn MutationExecutor>,
    progress: Progress,
}

impl BulkWriter {
    pub fn new(mutation: Arc<dyn MutationExecutor>, progress: Progress) -> Self {
        Self { mutation, progress }
    }

    /// Create each item in order. `entity` names the record type in messages.
    pub async fn create_all<T: Serialize>(
        &self,
        op: &Operation,
        entity: &str,
        items: Vec<WriteItem<T>>,
    ) -> WriteReport {
        let mut report = WriteReport {
            attempted: items.len(),
            ..Default::default()
        };

        for item in items {
            match self.create_one(op, &item.input).await {
                Ok(target_id) => {
                    debug!("{}: {} -> {}", op, item.source_id, target_id);
                    report.succeeded += 1;
                    report.mappings.push(IdMapping {
                        source_id: item.source_id,
                        target_id,
                    });
                }
                Err(e) => {
                    self.progress.error(format!(
                        "Error creating {} for {}: {}",
                        entity, item.natural_key, e
                    ));
                    report.failures.push(ItemFailure {
                        natural_key: item.natural_key,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    async fn create_one<T: Serialize>(&self, op: &Operation, input: &T) -> Result<String> {
        let variables = json!({ "input": serde_json::to_value(input)? });
        let record = self.mutation.mutate(op, variables).await?;
        record_id(op, &record)
    }

    /// Delete each row in order.
    pub async fn delete_all(&self, op: &Operation, entity: &str, items: Vec<DeleteItem>) -> WriteReport {
        let mut report = WriteReport {
            attempted: items.len(),
            ..Default::default()
        };

        for item in items {
            let variables = json!({ "input": { "id": item.id } });
            match self.mutation.mutate(op, variables).await {
                Ok(_) => {
                    debug!("{}: deleted {}", op, item.id);
                    report.succeeded += 1;
                }
                Err(e) => {
                    self.progress.error(format!(
                        "Error deleting {} {}: {}",
                        entity, item.natural_key, e
                    ));
                    report.failures.push(ItemFailure {
                        natural_key: item.natural_key,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Delete every row of `existing`: payments, then properties, then
    /// profiles. The target enforces foreign keys, so this order is required.
    pub async fn clear(&self, existing: &TargetSnapshot) -> ClearReport {
        let payments = existing
            .payments
            .iter()
            .map(|p| DeleteItem {
                id: p.id.clone(),
                natural_key: format!("check #{}", p.natural_key()),
            })
            .collect();
        let properties = existing
            .properties
            .iter()
            .map(|p| DeleteItem {
                id: p.id.clone(),
                natural_key: p.address.clone(),
            })
            .collect();
        let profiles = existing
            .profiles
            .iter()
            .map(|p| DeleteItem {
                id: p.id.clone(),
                natural_key: p.name.clone(),
            })
            .collect();

        let mut report = ClearReport::default();

        if !existing.payments.is_empty() {
            self.progress
                .info(format!("Deleting {} payments...", existing.payments.len()));
        }
        report.payments = self.delete_all(&DELETE_PAYMENT, "payment", payments).await;

        if !existing.properties.is_empty() {
            self.progress
                .info(format!("Deleting {} properties...", existing.properties.len()));
        }
        report.properties = self
            .delete_all(&DELETE_PROPERTY, "property", properties)
            .await;

        if !existing.profiles.is_empty() {
            self.progress
                .info(format!("Deleting {} profiles...", existing.profiles.len()));
        }
        report.profiles = self.delete_all(&DELETE_PROFILE, "profile", profiles).await;

        report
    }
}

fn record_id(op: &Operation, record: &Value) -> Result<String> {
    match record.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(MigrateError::decode(
            op.root_field,
            "response record has no id",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::target::CREATE_PROFILE;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every mutation; rejects inputs whose name is in `reject`.
    #[derive(Default)]
    struct RecordingMutations {
        calls: Mutex<Vec<(String, Value)>>,
        reject: Vec<&'static str>,
        omit_id: bool,
    }

    #[async_trait]
    impl MutationExecutor for RecordingMutations {
        async fn mutate(&self, op: &Operation, variables: Value) -> Result<Value> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((op.root_field.to_string(), variables.clone()));
            let name = variables["input"]["name"].as_str().unwrap_or_default();
            if self.reject.contains(&name) {
                return Err(MigrateError::remote(op.root_field, "validation error"));
            }
            if self.omit_id {
                return Ok(json!({}));
            }
            Ok(json!({ "id": format!("new-{}", calls.len()) }))
        }
    }

    fn profile_item(id: &str, name: &str) -> WriteItem<Value> {
        WriteItem {
            source_id: id.to_string(),
            natural_key: name.to_string(),
            input: json!({ "name": name }),
        }
    }

    #[tokio::test]
    async fn test_create_all_continues_past_failures() {
        let mutations = Arc::new(RecordingMutations {
            reject: vec!["Bob"],
            ..Default::default()
        });
        let writer = BulkWriter::new(mutations.clone(), Progress::silent());

        let report = writer
            .create_all(
                &CREATE_PROFILE,
                "profile",
                vec![
                    profile_item("o1", "Alice"),
                    profile_item("o2", "Bob"),
                    profile_item("o3", "Carol"),
                ],
            )
            .await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].natural_key, "Bob");
        assert_eq!(
            report.mappings,
            vec![
                IdMapping {
                    source_id: "o1".to_string(),
                    target_id: "new-1".to_string()
                },
                IdMapping {
                    source_id: "o3".to_string(),
                    target_id: "new-3".to_string()
                },
            ]
        );

        let calls = mutations.calls.lock().unwrap();
        let names: Vec<&str> = calls
            .iter()
            .map(|(_, v)| v["input"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[tokio::test]
    async fn test_create_without_id_is_a_failure() {
        let mutations = Arc::new(RecordingMutations {
            omit_id: true,
            ..Default::default()
        });
        let writer = BulkWriter::new(mutations, Progress::silent());
        let report = writer
            .create_all(&CREATE_PROFILE, "profile", vec![profile_item("o1", "Alice")])
            .await;
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed(), 1);
        assert!(report.mappings.is_empty());
    }

    #[tokio::test]
    async fn test_clear_deletes_in_dependency_order() {
        let mutations = Arc::new(RecordingMutations::default());
        let writer = BulkWriter::new(mutations.clone(), Progress::silent());

        let existing = TargetSnapshot {
            profiles: vec![Profile {
                id: "pf1".to_string(),
                name: "Alice".to_string(),
                ..Default::default()
            }],
            properties: vec![Property {
                id: "pr1".to_string(),
                address: "Unit 1".to_string(),
                ..Default::default()
            }],
            payments: vec![Payment {
                id: "pay1".to_string(),
                ..Default::default()
            }],
        };

        let report = writer.clear(&existing).await;
        assert_eq!(report.deleted(), 3);
        assert_eq!(report.failed(), 0);

        let calls = mutations.calls.lock().unwrap();
        let order: Vec<(&str, &str)> = calls
            .iter()
            .map(|(op, v)| (op.as_str(), v["input"]["id"].as_str().unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("deletePayment", "pay1"),
                ("deleteProperty", "pr1"),
                ("deleteProfile", "pf1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_clear_of_empty_target_issues_nothing() {
        let mutations = Arc::new(RecordingMutations::default());
        let writer = BulkWriter::new(mutations.clone(), Progress::silent());
        let report = writer.clear(&TargetSnapshot::default()).await;
        assert_eq!(report.deleted(), 0);
        assert!(mutations.calls.lock().unwrap().is_empty());
    }
}
