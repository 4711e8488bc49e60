//! Deferred registration and fixed-point materialization of compiled-in types.
//!
//! # Purpose
//!
//! Compiled-in classes, structs and enums describe themselves while the process
//! starts, long before storage slots, containers or the collector exist. This
//! crate records those descriptions and, once storage is ready, turns them into
//! named runtime type objects with default instances, in dependency order.
//!
//! # Mental Model
//!
//! 1. **Declaration:** [`Bootstrap::declare`] (directly, or through
//!    [`compiled_in!`] and [`Bootstrap::collect_compiled_in`]) pushes descriptors
//!    into per-kind queues. Classes also get an unnamed object that is recorded
//!    in the pending ledger, or in a module bucket when per-module bootstrap is on.
//! 2. **Storage readiness:** [`Bootstrap::init_object_system`] sizes the object
//!    array and names everything already in the ledger.
//! 3. **Epochs:** [`Bootstrap::run_bootstrap_epoch`] releases a module's bucket and
//!    runs [`Bootstrap::materialize_all`] until no queue has work left.
//! 4. **Finalization:** outside the initial load phase, an epoch that produced
//!    classes assembles GC reference metadata once. The initial load defers that
//!    to [`Bootstrap::end_initial_load`].
//!
//! # Ordering Contract
//!
//! - Within a kind, descriptors run in declaration order.
//! - Within a pass, enums run before structs, structs before classes.
//! - Default instances are built bucket by bucket following
//!   [`BootstrapConfig::container_priority`], then everything else.
//! - Pending registrants are named in arrival order; a super type that has not
//!   been reached yet is named on demand.
//!
//! # Invariants
//!
//! - A pending registrant is processed at most once.
//!   - Enforced in: [`ledger::PendingLedger::consume`].
//!   - Tested by: `invariants::test_force_materialize_is_idempotent`
//!   - Failure symptom: `AlreadyNamed` object errors.
//!
//! - `materialize_all` never returns with queued work.
//!   - Enforced in: `Bootstrap::run_fixed_point`.
//!   - Tested by: `invariants::test_fixed_point_quiesces`
//!   - Failure symptom: types declared by default-instance hooks never appear.
//!
//! - GC reference metadata is assembled at most once per epoch and never during
//!   the initial load.
//!   - Enforced in: `Bootstrap::run_fixed_point`, [`Bootstrap::end_initial_load`].
//!   - Tested by: `invariants::test_gc_assembly_once_per_epoch`
//!   - Failure symptom: collector walks stale or missing reference tokens.
//!
//! # Errors
//!
//! Every [`BootstrapError`] is fatal: the failing [`Bootstrap`] is poisoned and
//! later calls return [`BootstrapError::Poisoned`]. Hosts are expected to abort.

pub mod catalog;
pub mod compiled_in;
pub mod config;
pub mod descriptor;
pub mod dynamic;
mod engine;
pub mod error;
pub mod events;
pub mod gc;
pub mod hot_reload;
pub mod ledger;
pub mod modules;
pub mod queue;
pub mod report;
pub mod types;

#[cfg(test)]
mod invariants;

pub use catalog::{CatalogEntry, CatalogHandle, TypeCatalog};
pub use compiled_in::CompiledIn;
pub use config::{BootstrapConfig, ConfigError};
pub use descriptor::{DefaultInstance, DefaultsHook, Fingerprint, TypeDescriptor, TypeKind, TypeSpec};
pub use dynamic::DynamicFactory;
pub use engine::{Bootstrap, LoadPhase};
pub use error::BootstrapError;
pub use events::{RegistrationEvent, RegistrationKind, RegistrationPhase};
pub use gc::{GcMetadata, ReferenceSchema, ReferenceToken};
pub use hot_reload::HotReloadEvent;
pub use modules::PendingModule;
pub use report::{EpochReport, IssueSeverity, KindCounts, PropertyIssue};
pub use types::RuntimeType;

#[doc(hidden)]
pub use inventory;
