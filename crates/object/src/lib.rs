//! Object model collaborators for the kiln bootstrap.
//!
//! This crate holds the pieces the bootstrap engine talks to but does not own:
//! object identities, the name table, the object arena with its name hash, the
//! garbage-collected object array that hands out storage slots, and the
//! container table. Each collaborator the engine needs to swap out in tests is
//! exposed as a trait ([`ObjectIndex`], [`ContainerProvider`]) with an in-memory
//! implementation alongside it.

/// Object records and the name hash.
pub mod arena;
/// Named containers that own objects.
pub mod container;
/// Debugger-style naming helpers.
pub mod debug;
/// Object-model error types.
pub mod error;
/// Object, slot and container flag sets.
pub mod flags;
/// Identity newtypes.
pub mod ids;
/// Storage slot allocation and the GC object array.
pub mod index;
/// Name interning.
pub mod name;

pub use arena::{ObjectArena, ObjectKind, ObjectRecord};
pub use container::{ContainerProvider, ContainerTable};
pub use debug::{debug_full_name, debug_name, debug_path_name};
pub use error::ObjectError;
pub use flags::{ContainerFlags, InternalFlags, ObjectFlags};
pub use ids::{ContainerId, InternalIndex, ObjectId};
pub use index::{GcObjectArray, ObjectIndex, ObjectPoolConfig};
pub use name::{Name, NameTable, strip_class_prefix};
