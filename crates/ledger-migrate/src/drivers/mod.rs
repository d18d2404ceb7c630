//! Remote datastore drivers.
//!
//! Each driver implements the [`QueryExecutor`](crate::core::QueryExecutor)
//! and [`MutationExecutor`](crate::core::MutationExecutor) capabilities:
//!
//! - [`graphql`]: GraphQL over HTTP (reqwest)
//! - [`memory`]: in-process datastore used by tests and dry runs

pub mod graphql;
pub mod memory;

pub use graphql::GraphqlClient;
pub use memory::{Call, MemoryStore};
