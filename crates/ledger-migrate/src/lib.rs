//! # ledger-migrate
//!
//! Migrates property-management records between two GraphQL datastores.
//!
//! Owners, units and payments are read from the source and written to the
//! target as profiles, properties and payments, with the owner references
//! remapped to the identifiers the target assigns. The run is driven as a
//! sequence of explicit steps:
//!
//! - **Fetch** every source collection through paginated list queries
//! - **Clear** the target in dependency order (payments, properties, profiles)
//! - **Load** profiles, then properties, then payments, skipping orphans
//! - **Verify** record counts and a sample of records per type
//!
//! ## Example
//!
//! ```rust,no_run
//! use ledger_migrate::{Config, Orchestrator, Session};
//!
//! #[tokio::main]
//! async fn main() -> ledger_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let session = Session::from_config(&config);
//!     let mut orchestrator = Orchestrator::new(session, config.migration);
//!     if let Some(result) = orchestrator.run(false).await?.completed() {
//!         println!("Created {} records", result.load.map_or(0, |l| l.created()));
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod source;
pub mod state;
pub mod target;
pub mod transform;
pub mod verify;

// Re-exports for convenient access
pub use config::{Config, EndpointConfig, MigrationConfig};
pub use error::{MigrateError, Result};
pub use orchestrator::{EntityStats, HealthCheckResult, LoadStats, MigrationResult, Orchestrator, Session};
pub use progress::{ChannelSink, Progress, ProgressEvent, ProgressSink, Severity};
pub use source::{SourceCounts, SourceSnapshot};
pub use state::{StepOutcome, WorkflowState};
pub use target::{ClearReport, TargetSnapshot};
pub use verify::{VerifyOutcome, VerifyReport};
