use kiln_object::{ObjectError, ObjectId, ObjectKind};

use crate::descriptor::TypeKind;

/// Fatal bootstrap failures.
///
/// None of these are recoverable: the dependency-order assumptions no longer
/// hold once one is raised, so the [`crate::Bootstrap`] that produced it is
/// poisoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootstrapError {
	/// The same object registered itself twice.
	#[error("duplicate pending registrant {id}: {container}.{name}")]
	DuplicateRegistrant {
		id: ObjectId,
		container: String,
		name: String,
	},
	/// Materialization was requested before storage was ready.
	#[error("object system is not initialized, cannot materialize {what}")]
	NotInitialized { what: String },
	/// A descriptor or registrant finished without name or container.
	#[error("{kind} {id} finished materialization without a name or container")]
	Unnamed { id: ObjectId, kind: ObjectKind },
	/// A descriptor produced a different kind than it was declared as.
	#[error("{name} was declared as {declared} but materialized as {produced}")]
	KindMismatch {
		name: String,
		declared: TypeKind,
		produced: ObjectKind,
	},
	/// A super type name resolved to nothing.
	#[error("super type {super_name} of {name} is not registered")]
	MissingSuper { name: String, super_name: String },
	/// A type was used before its descriptor ran.
	#[error("{0} has not been materialized")]
	UnknownType(String),
	/// Default-instance construction looped back on itself.
	#[error("circular default instance dependency: {chain}")]
	CircularDependency { chain: String },
	/// A disregarded-for-GC object is outside the root set.
	#[error("{path} is disregarded for GC but not part of the root set")]
	DisregardedNotRooted { path: String },
	/// A type was declared again while no hot reload was in progress.
	#[error("trying to recreate {name} outside of hot reload")]
	RecreatedOutsideHotReload { name: String },
	/// A default-instance hook gave up.
	#[error("default instance of {class} failed: {message}")]
	DefaultsFailed { class: String, message: String },
	#[error(transparent)]
	Object(#[from] ObjectError),
	/// An earlier call already failed.
	#[error("bootstrap is poisoned by an earlier fatal error")]
	Poisoned,
}
