//! Remote capabilities for one migration run.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::core::operation::source::LIST_OWNERS;
use crate::core::operation::target::LIST_PROFILES;
use crate::core::{MutationExecutor, Operation, QueryExecutor};
use crate::drivers::{GraphqlClient, MemoryStore};

/// Source and target capabilities held by an orchestrator.
///
/// The source is only ever queried. Credentials are owned by the drivers;
/// the engine never sees them.
#[derive(Clone)]
pub struct Session {
    pub source: Arc<dyn QueryExecutor>,
    pub target_query: Arc<dyn QueryExecutor>,
    pub target_mutation: Arc<dyn MutationExecutor>,
}

impl Session {
    pub fn new(
        source: Arc<dyn QueryExecutor>,
        target_query: Arc<dyn QueryExecutor>,
        target_mutation: Arc<dyn MutationExecutor>,
    ) -> Self {
        Self {
            source,
            target_query,
            target_mutation,
        }
    }

    /// GraphQL clients for the configured endpoints.
    pub fn from_config(config: &Config) -> Self {
        let source = Arc::new(GraphqlClient::new(&config.source));
        let target = Arc::new(GraphqlClient::new(&config.target));
        Self::new(source, target.clone(), target)
    }

    /// Two in-process stores.
    pub fn in_memory(source: Arc<MemoryStore>, target: Arc<MemoryStore>) -> Self {
        Self::new(source, target.clone(), target)
    }

    /// Issue one single-item list query against each endpoint.
    pub async fn health_check(&self) -> HealthCheckResult {
        let (source_connected, source_latency_ms, source_error) =
            probe(self.source.as_ref(), &LIST_OWNERS).await;
        let (target_connected, target_latency_ms, target_error) =
            probe(self.target_query.as_ref(), &LIST_PROFILES).await;

        HealthCheckResult {
            source_connected,
            source_latency_ms,
            source_error,
            target_connected,
            target_latency_ms,
            target_error,
            healthy: source_connected && target_connected,
        }
    }
}

async fn probe(executor: &dyn QueryExecutor, op: &Operation) -> (bool, u64, Option<String>) {
    let start = Instant::now();
    let result = executor
        .query(op, json!({ "limit": 1, "nextToken": null }))
        .await;
    let latency = start.elapsed().as_millis() as u64;
    match result {
        Ok(_) => (true, latency, None),
        Err(e) => (false, latency, Some(e.to_string())),
    }
}

/// Result of a health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    pub target_connected: bool,
    pub target_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_error: Option<String>,
    pub healthy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_reports_each_side() {
        let source = Arc::new(MemoryStore::new());
        let target = Arc::new(MemoryStore::new());
        target.fail_queries("listProfiles");
        let session = Session::in_memory(source, target);

        let result = session.health_check().await;
        assert!(result.source_connected);
        assert!(result.source_error.is_none());
        assert!(!result.target_connected);
        assert!(result.target_error.unwrap().contains("listProfiles"));
        assert!(!result.healthy);
    }
}
