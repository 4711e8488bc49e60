use crate::ids::{ContainerId, InternalIndex, ObjectId};
use crate::name::Name;

/// Object-model failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
	/// The identity was never allocated by this arena.
	#[error("unknown object {0}")]
	UnknownObject(ObjectId),
	/// `add_object` on an object that already has a name.
	#[error("object {id} is already named ({existing:?})")]
	AlreadyNamed { id: ObjectId, existing: Name },
	/// Another object already holds the name in the container.
	#[error("name {name:?} in {container} is already taken by {owner}")]
	NameTaken {
		name: Name,
		container: ContainerId,
		owner: ObjectId,
	},
	/// Naming an object with [`Name::NONE`].
	#[error("object {0} cannot be named None")]
	EmptyName(ObjectId),
	/// The object array has not been initialized or was shut down.
	#[error("object array is not initialized")]
	NotReady,
	/// Every slot is in use.
	#[error("object array is full (max_objects={max})")]
	ArrayFull { max: usize },
	/// The slot is free or out of range.
	#[error("invalid object index {0}")]
	InvalidIndex(InternalIndex),
	/// Slots inside the disregard-for-GC region are permanent.
	#[error("slot {0} is disregarded for GC and cannot be freed")]
	PermanentSlot(InternalIndex),
}
