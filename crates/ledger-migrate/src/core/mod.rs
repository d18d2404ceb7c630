//! Core abstractions for the migration engine.
//!
//! - [`traits`]: query and mutation capabilities implemented by drivers
//! - [`operation`]: descriptors for every remote query and mutation
//! - [`entity`]: source and target record shapes
//! - [`registry`]: source id → target id mapping built during load
//!
//! Nothing here performs I/O; drivers in `drivers/` implement the traits.

pub mod entity;
pub mod operation;
pub mod registry;
pub mod traits;

pub use entity::{
    Amount, NewPayment, NewProfile, NewProperty, Owner, OwnerRef, Payment, Profile, Property, Unit,
};
pub use operation::{Operation, OperationKind};
pub use registry::IdRegistry;
pub use traits::{MutationExecutor, Page, QueryExecutor};
