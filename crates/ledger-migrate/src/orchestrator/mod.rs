//! Migration orchestrator - main workflow coordinator.
//!
//! Drives the run through its steps: fetch the source, clear the target,
//! load profiles, properties and payments, verify, complete. Each step
//! checks its own preconditions and is refused with a warning when they
//! do not hold.

mod session;

pub use session::{HealthCheckResult, Session};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MigrationConfig;
use crate::core::operation::target::{CREATE_PAYMENT, CREATE_PROFILE, CREATE_PROPERTY};
use crate::core::IdRegistry;
use crate::error::Result;
use crate::progress::Progress;
use crate::source::{SourceCounts, SourceSnapshot};
use crate::state::{StepOutcome, WorkflowState};
use crate::target::{BulkWriter, ClearReport, TargetSnapshot, WriteItem, WriteReport};
use crate::transform::Transformer;
use crate::verify::{Verifier, VerifyOutcome, VerifyReport};

/// Per-entity load counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStats {
    /// Create calls issued.
    pub attempted: usize,
    pub created: usize,
    pub failed: usize,
    /// Records with no mapped owner; never sent.
    pub skipped: usize,
}

impl EntityStats {
    fn from_report(report: &WriteReport, skipped: usize) -> Self {
        Self {
            attempted: report.attempted,
            created: report.succeeded,
            failed: report.failed(),
            skipped,
        }
    }
}

/// Load counters for every entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub profiles: EntityStats,
    pub properties: EntityStats,
    pub payments: EntityStats,
}

impl LoadStats {
    pub fn created(&self) -> usize {
        self.profiles.created + self.properties.created + self.payments.created
    }

    pub fn failed(&self) -> usize {
        self.profiles.failed + self.properties.failed + self.payments.failed
    }

    pub fn skipped(&self) -> usize {
        self.profiles.skipped + self.properties.skipped + self.payments.skipped
    }
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Workflow state when the summary was taken.
    pub status: WorkflowState,

    /// When the run started (or was last reset).
    pub started_at: DateTime<Utc>,

    /// When the summary was taken.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Source record counts, once fetched.
    pub source: Option<SourceCounts>,

    /// Target rows deleted by the last clear.
    pub records_deleted: usize,

    /// Deletes that failed during the last clear.
    pub delete_failures: usize,

    /// Load counters, once loaded.
    pub load: Option<LoadStats>,

    /// Verification outcome, once verified.
    pub verification: Option<VerifyOutcome>,

    /// Discrepancies found by verification.
    pub discrepancies: usize,
}

impl MigrationResult {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Migration orchestrator.
pub struct Orchestrator {
    session: Session,
    config: MigrationConfig,
    transformer: Transformer,
    progress: Progress,
    state: WorkflowState,
    run_id: String,
    started_at: DateTime<Utc>,
    source: Option<SourceSnapshot>,
    target_cleared: bool,
    clear_report: Option<ClearReport>,
    profile_ids: IdRegistry,
    property_ids: IdRegistry,
    load_stats: Option<LoadStats>,
    report: Option<VerifyReport>,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(session: Session, config: MigrationConfig) -> Self {
        Self {
            transformer: Transformer::new(&config),
            session,
            config,
            progress: Progress::silent(),
            state: WorkflowState::SourceIdle,
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            source: None,
            target_cleared: false,
            clear_report: None,
            profile_ids: IdRegistry::new("owner->profile"),
            property_ids: IdRegistry::new("unit->property"),
            load_stats: None,
            report: None,
        }
    }

    /// Report progress to `progress` instead of only logging.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn source(&self) -> Option<&SourceSnapshot> {
        self.source.as_ref()
    }

    pub fn source_counts(&self) -> Option<SourceCounts> {
        self.source.as_ref().map(SourceSnapshot::counts)
    }

    pub fn clear_report(&self) -> Option<&ClearReport> {
        self.clear_report.as_ref()
    }

    pub fn load_stats(&self) -> Option<LoadStats> {
        self.load_stats
    }

    /// Last verification report.
    pub fn report(&self) -> Option<&VerifyReport> {
        self.report.as_ref()
    }

    /// Source owner id → target profile id.
    pub fn profile_ids(&self) -> &IdRegistry {
        &self.profile_ids
    }

    /// Source unit id → target property id.
    pub fn property_ids(&self) -> &IdRegistry {
        &self.property_ids
    }

    fn refuse<T>(&self, reason: &str) -> StepOutcome<T> {
        self.progress.warning(reason);
        StepOutcome::Refused(reason.to_string())
    }

    /// Fetch owners, units and payments from the source.
    ///
    /// A failure leaves the state and any earlier snapshot untouched.
    pub async fn fetch_source(&mut self) -> Result<StepOutcome<SourceCounts>> {
        if self.state.is_loaded() {
            return Ok(self.refuse("Target already loaded in this run; reset before fetching again"));
        }

        self.progress.info("Fetching source data...");
        let snapshot =
            match SourceSnapshot::fetch(self.session.source.as_ref(), self.config.page_size).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    self.progress
                        .error(format!("Error fetching source data: {}", e));
                    return Err(e);
                }
            };

        let counts = snapshot.counts();
        self.progress.success(format!(
            "Fetched {} owners, {} units, {} payments",
            counts.owners, counts.units, counts.payments
        ));
        self.source = Some(snapshot);
        self.state = WorkflowState::SourceFetched;
        Ok(StepOutcome::Completed(counts))
    }

    /// Delete every profile, property and payment in the target.
    ///
    /// Individual delete failures are counted in the report. A failure to
    /// list the existing rows moves the workflow to `error`.
    pub async fn clear_target(&mut self) -> Result<ClearReport> {
        self.progress.info("Clearing target data...");
        let existing =
            match TargetSnapshot::fetch(self.session.target_query.as_ref(), self.config.page_size)
                .await
            {
                Ok(existing) => existing,
                Err(e) => {
                    self.progress
                        .error(format!("Error clearing target data: {}", e));
                    self.target_cleared = false;
                    self.state = WorkflowState::Error;
                    return Err(e);
                }
            };

        let writer = BulkWriter::new(self.session.target_mutation.clone(), self.progress.clone());
        let report = writer.clear(&existing).await;

        if report.failed() == 0 {
            self.progress.success(format!(
                "Target cleared ({} records deleted)",
                report.deleted()
            ));
        } else {
            self.progress.warning(format!(
                "Target cleared with errors ({} deleted, {} failed)",
                report.deleted(),
                report.failed()
            ));
        }

        self.target_cleared = true;
        self.clear_report = Some(report.clone());
        self.state = WorkflowState::TargetCleared;
        Ok(report)
    }

    /// Create profiles, then properties, then payments in the target.
    ///
    /// Per-item failures are counted and processing continues. Units and
    /// payments whose owner has no profile are skipped with a warning.
    pub async fn load_target(&mut self) -> StepOutcome<LoadStats> {
        let owners_loaded = self.source.as_ref().is_some_and(|s| !s.owners.is_empty());
        if !owners_loaded {
            return self.refuse("No source data to migrate; fetch the source first");
        }
        if !self.profile_ids.is_empty() || !self.property_ids.is_empty() {
            return self.refuse("Target already loaded in this run; reset before loading again");
        }
        if !self.target_cleared {
            return self.refuse("Target has not been cleared; clear it before loading");
        }
        let Some(source) = self.source.take() else {
            return self.refuse("No source data to migrate; fetch the source first");
        };

        let writer = BulkWriter::new(self.session.target_mutation.clone(), self.progress.clone());
        let mut stats = LoadStats::default();

        // Profiles
        self.progress
            .info(format!("Creating {} profiles...", source.owners.len()));
        let items = source
            .owners
            .iter()
            .map(|owner| WriteItem {
                source_id: owner.id.clone(),
                natural_key: owner.name.clone(),
                input: self.transformer.profile(owner),
            })
            .collect();
        let report = writer.create_all(&CREATE_PROFILE, "profile", items).await;
        for mapping in &report.mappings {
            self.profile_ids
                .insert(mapping.source_id.as_str(), mapping.target_id.as_str());
        }
        stats.profiles = EntityStats::from_report(&report, 0);
        self.progress
            .success(format!("Created {} profiles", stats.profiles.created));

        // Properties
        self.progress
            .info(format!("Creating {} properties...", source.units.len()));
        let mut items = Vec::with_capacity(source.units.len());
        let mut skipped = 0;
        for unit in &source.units {
            match self.transformer.property(unit, &self.profile_ids) {
                Ok(input) => items.push(WriteItem {
                    source_id: unit.id.clone(),
                    natural_key: unit.unit_number.clone(),
                    input,
                }),
                Err(reason) => {
                    skipped += 1;
                    self.progress
                        .warning(format!("Skipping unit {} - {}", unit.unit_number, reason));
                }
            }
        }
        let report = writer.create_all(&CREATE_PROPERTY, "property", items).await;
        for mapping in &report.mappings {
            self.property_ids
                .insert(mapping.source_id.as_str(), mapping.target_id.as_str());
        }
        stats.properties = EntityStats::from_report(&report, skipped);
        self.progress
            .success(format!("Created {} properties", stats.properties.created));

        // Payments
        self.progress
            .info(format!("Creating {} payments...", source.payments.len()));
        let mut items = Vec::with_capacity(source.payments.len());
        let mut skipped = 0;
        for payment in &source.payments {
            match self.transformer.payment(payment, &self.profile_ids) {
                Ok(input) => items.push(WriteItem {
                    source_id: payment.id.clone(),
                    natural_key: payment.natural_key().to_string(),
                    input,
                }),
                Err(reason) => {
                    skipped += 1;
                    self.progress.warning(format!(
                        "Skipping payment {} - {}",
                        payment.natural_key(),
                        reason
                    ));
                }
            }
        }
        let report = writer.create_all(&CREATE_PAYMENT, "payment", items).await;
        stats.payments = EntityStats::from_report(&report, skipped);
        self.progress
            .success(format!("Created {} payments", stats.payments.created));

        info!(
            "Load finished: {} created, {} failed, {} skipped",
            stats.created(),
            stats.failed(),
            stats.skipped()
        );

        self.source = Some(source);
        self.target_cleared = false;
        self.load_stats = Some(stats);
        self.state = WorkflowState::TargetLoaded;
        StepOutcome::Completed(stats)
    }

    /// Compare the target against the held source snapshot.
    ///
    /// Discrepancies are part of the report. A failure to list the target
    /// moves the workflow to `error`.
    pub async fn verify(&mut self) -> Result<StepOutcome<VerifyReport>> {
        if !self.state.can_verify() {
            return Ok(self.refuse("Target has not been loaded; load it before verifying"));
        }
        let Some(source) = self.source.as_ref() else {
            return Ok(self.refuse("No source data to verify against; fetch the source first"));
        };

        let target =
            match TargetSnapshot::fetch(self.session.target_query.as_ref(), self.config.page_size)
                .await
            {
                Ok(target) => target,
                Err(e) => {
                    self.progress
                        .error(format!("Error verifying target data: {}", e));
                    self.state = WorkflowState::Error;
                    return Err(e);
                }
            };

        let verifier = Verifier::new(
            self.config.sample_size,
            self.transformer.clone(),
            self.progress.clone(),
        );
        let report = verifier.verify(source, &target);

        self.report = Some(report.clone());
        self.state = WorkflowState::TargetVerified;
        Ok(StepOutcome::Completed(report))
    }

    /// Mark the run complete.
    pub fn complete(&mut self) -> StepOutcome<MigrationResult> {
        if !self.state.can_verify() {
            return self.refuse("Target has not been loaded; nothing to complete");
        }
        self.state = WorkflowState::Complete;
        self.progress.success("Migration complete");
        StepOutcome::Completed(self.result())
    }

    /// Discard everything held for this run and start over.
    ///
    /// Writes already made to the target stay there.
    pub fn reset(&mut self) {
        self.source = None;
        self.target_cleared = false;
        self.clear_report = None;
        self.profile_ids.clear();
        self.property_ids.clear();
        self.load_stats = None;
        self.report = None;
        self.run_id = uuid::Uuid::new_v4().to_string();
        self.started_at = Utc::now();
        self.state = WorkflowState::SourceIdle;
        self.progress.info("Migration reset");
    }

    /// Run every step in order: fetch, clear, load, verify (unless
    /// skipped), complete.
    pub async fn run(&mut self, skip_verify: bool) -> Result<StepOutcome<MigrationResult>> {
        info!("Starting migration run: {}", self.run_id);

        if let StepOutcome::Refused(reason) = self.fetch_source().await? {
            return Ok(StepOutcome::Refused(reason));
        }
        // An empty source must never wipe the target.
        if !self.source.as_ref().is_some_and(|s| !s.owners.is_empty()) {
            return Ok(self.refuse("No source data to migrate; fetch the source first"));
        }
        self.clear_target().await?;
        if let StepOutcome::Refused(reason) = self.load_target().await {
            return Ok(StepOutcome::Refused(reason));
        }
        if !skip_verify {
            if let StepOutcome::Refused(reason) = self.verify().await? {
                return Ok(StepOutcome::Refused(reason));
            }
        }
        Ok(self.complete())
    }

    /// Summary of the run so far.
    pub fn result(&self) -> MigrationResult {
        let completed_at = Utc::now();
        let duration = (completed_at - self.started_at).num_milliseconds() as f64 / 1000.0;

        MigrationResult {
            run_id: self.run_id.clone(),
            status: self.state,
            started_at: self.started_at,
            completed_at,
            duration_seconds: duration,
            source: self.source_counts(),
            records_deleted: self.clear_report.as_ref().map_or(0, ClearReport::deleted),
            delete_failures: self.clear_report.as_ref().map_or(0, ClearReport::failed),
            load: self.load_stats,
            verification: self.report.as_ref().map(|r| r.outcome),
            discrepancies: self.report.as_ref().map_or(0, VerifyReport::discrepancy_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn orchestrator() -> (Orchestrator, Arc<MemoryStore>, Arc<MemoryStore>) {
        let source = Arc::new(MemoryStore::new());
        let target = Arc::new(MemoryStore::new());
        let session = Session::in_memory(source.clone(), target.clone());
        (
            Orchestrator::new(session, MigrationConfig::default()),
            source,
            target,
        )
    }

    #[tokio::test]
    async fn test_new_orchestrator_is_idle() {
        let (orch, _, _) = orchestrator();
        assert_eq!(orch.state(), WorkflowState::SourceIdle);
        assert!(orch.source_counts().is_none());
        assert!(orch.load_stats().is_none());
        assert!(orch.report().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_snapshot() {
        let (mut orch, source, _) = orchestrator();
        source.seed("owners", vec![json!({"id": "o1", "name": "Jane"})]);
        orch.fetch_source().await.unwrap();

        source.fail_queries("listUnits");
        assert!(orch.fetch_source().await.is_err());
        assert_eq!(orch.state(), WorkflowState::SourceFetched);
        assert_eq!(orch.source_counts().unwrap().owners, 1);
    }

    #[tokio::test]
    async fn test_verify_before_load_is_refused() {
        let (mut orch, _, target) = orchestrator();
        let outcome = orch.verify().await.unwrap();
        assert_eq!(
            outcome.refusal(),
            Some("Target has not been loaded; load it before verifying")
        );
        assert!(target.calls().is_empty());
        assert!(orch.complete().is_refused());
        assert_eq!(orch.state(), WorkflowState::SourceIdle);
    }

    #[tokio::test]
    async fn test_result_serializes() {
        let (orch, _, _) = orchestrator();
        let json = orch.result().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "source-idle");
        assert_eq!(value["records_deleted"], 0);
        assert!(value["load"].is_null());
    }
}
