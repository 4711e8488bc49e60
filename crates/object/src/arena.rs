//! Object records and the name hash.
//!
//! # Mental Model
//!
//! An object comes into existence in two steps. [`ObjectArena::allocate`]
//! reserves a record with no name, no container and no slot; that works at any
//! time, including before the object system is initialized. Later,
//! [`ObjectArena::add_object`] assigns name, container and slot together and
//! only then inserts the object into the name hash.
//!
//! # Invariants
//!
//! - An object is reachable through [`ObjectArena::find`] only once it has both a
//!   name and a container.
//!   - Enforced in: [`ObjectArena::add_object`], [`ObjectArena::rename`].
//!   - Tested by: `tests::unnamed_objects_are_not_hashed`
//!   - Failure symptom: lookups return half-built type objects.
//!
//! - At most one object per (container, name).
//!   - Enforced in: [`ObjectArena::add_object`], [`ObjectArena::rename`].
//!   - Tested by: `tests::name_collisions_are_rejected`
//!   - Failure symptom: lookups flip between two objects.

use rustc_hash::FxHashMap as HashMap;
use smallvec::SmallVec;

use crate::error::ObjectError;
use crate::flags::ObjectFlags;
use crate::ids::{ContainerId, InternalIndex, ObjectId};
use crate::name::{Name, NameTable};

/// What an object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
	/// Runtime type object for an enumeration.
	Enum,
	/// Runtime type object for a struct.
	Struct,
	/// Runtime type object for a class.
	Class,
	/// Instance of a class (default instances included).
	Instance,
}

impl ObjectKind {
	/// Name used for the implicit class of type objects.
	pub const fn meta_class_name(self) -> &'static str {
		match self {
			ObjectKind::Enum => "Enum",
			ObjectKind::Struct => "ScriptStruct",
			ObjectKind::Class => "Class",
			ObjectKind::Instance => "Object",
		}
	}
}

impl core::fmt::Display for ObjectKind {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		let label = match self {
			ObjectKind::Enum => "enum",
			ObjectKind::Struct => "struct",
			ObjectKind::Class => "class",
			ObjectKind::Instance => "instance",
		};
		f.write_str(label)
	}
}

/// One object's bookkeeping.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
	kind: ObjectKind,
	name: Name,
	container: Option<ContainerId>,
	class: Option<ObjectId>,
	flags: ObjectFlags,
	index: Option<InternalIndex>,
}

impl ObjectRecord {
	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	pub fn name(&self) -> Name {
		self.name
	}

	pub fn container(&self) -> Option<ContainerId> {
		self.container
	}

	/// Class of an instance; `None` for type objects.
	pub fn class(&self) -> Option<ObjectId> {
		self.class
	}

	pub fn flags(&self) -> ObjectFlags {
		self.flags
	}

	/// Storage slot, once the object has been added.
	pub fn index(&self) -> Option<InternalIndex> {
		self.index
	}

	/// Named and owned by a container.
	pub fn is_named(&self) -> bool {
		!self.name.is_none() && self.container.is_some()
	}
}

/// Arena of object records with a (container, name) hash.
#[derive(Debug, Default)]
pub struct ObjectArena {
	records: Vec<ObjectRecord>,
	hash: HashMap<(ContainerId, Name), ObjectId>,
	by_name: HashMap<Name, SmallVec<[ObjectId; 2]>>,
}

impl ObjectArena {
	/// Creates an empty arena.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of records, named or not.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// True when nothing has been allocated.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Reserves an unnamed, unowned record.
	pub fn allocate(&mut self, kind: ObjectKind, flags: ObjectFlags) -> ObjectId {
		let id = ObjectId::from_usize(self.records.len());
		self.records.push(ObjectRecord {
			kind,
			name: Name::NONE,
			container: None,
			class: None,
			flags,
			index: None,
		});
		id
	}

	pub fn get(&self, id: ObjectId) -> Option<&ObjectRecord> {
		self.records.get(id.as_usize())
	}

	/// Like [`Self::get`], failing with [`ObjectError::UnknownObject`].
	pub fn record(&self, id: ObjectId) -> Result<&ObjectRecord, ObjectError> {
		self.get(id).ok_or(ObjectError::UnknownObject(id))
	}

	fn record_mut(&mut self, id: ObjectId) -> Result<&mut ObjectRecord, ObjectError> {
		self.records
			.get_mut(id.as_usize())
			.ok_or(ObjectError::UnknownObject(id))
	}

	/// Assigns name, container and slot, then hashes the object.
	pub fn add_object(
		&mut self,
		id: ObjectId,
		name: Name,
		container: ContainerId,
		index: InternalIndex,
	) -> Result<(), ObjectError> {
		let record = self.record(id)?;
		if !record.name.is_none() {
			return Err(ObjectError::AlreadyNamed {
				id,
				existing: record.name,
			});
		}
		self.check_free(id, name, container)?;

		let record = self.record_mut(id)?;
		record.name = name;
		record.container = Some(container);
		record.index = Some(index);
		self.hash_object(id, name, container);
		Ok(())
	}

	/// Moves an object to a new name and, optionally, a new container.
	pub fn rename(
		&mut self,
		id: ObjectId,
		name: Name,
		container: Option<ContainerId>,
	) -> Result<(), ObjectError> {
		let record = self.record(id)?;
		let old_name = record.name;
		let old_container = record.container;
		let Some(target) = container.or(old_container) else {
			return Err(ObjectError::UnknownObject(id));
		};
		self.check_free(id, name, target)?;

		if let Some(old_container) = old_container {
			self.unhash_object(id, old_name, old_container);
		}
		let record = self.record_mut(id)?;
		record.name = name;
		record.container = Some(target);
		self.hash_object(id, name, target);
		Ok(())
	}

	fn check_free(&self, id: ObjectId, name: Name, container: ContainerId) -> Result<(), ObjectError> {
		if name.is_none() {
			return Err(ObjectError::EmptyName(id));
		}
		match self.hash.get(&(container, name)) {
			Some(&owner) if owner != id => Err(ObjectError::NameTaken {
				name,
				container,
				owner,
			}),
			_ => Ok(()),
		}
	}

	fn hash_object(&mut self, id: ObjectId, name: Name, container: ContainerId) {
		self.hash.insert((container, name), id);
		self.by_name.entry(name).or_default().push(id);
	}

	fn unhash_object(&mut self, id: ObjectId, name: Name, container: ContainerId) {
		if self.hash.get(&(container, name)) == Some(&id) {
			self.hash.remove(&(container, name));
		}
		if let Some(ids) = self.by_name.get_mut(&name) {
			ids.retain(|other| *other != id);
			if ids.is_empty() {
				self.by_name.remove(&name);
			}
		}
	}

	/// Looks up an object by container and name.
	pub fn find(&self, container: ContainerId, name: Name) -> Option<ObjectId> {
		self.hash.get(&(container, name)).copied()
	}

	/// Looks up an object by name in any container.
	///
	/// Transient objects are skipped, which hides retired type objects from
	/// ordinary lookups.
	pub fn find_any(&self, name: Name, kind: Option<ObjectKind>) -> Option<ObjectId> {
		self.by_name.get(&name)?.iter().copied().find(|&id| {
			self.get(id).is_some_and(|r| {
				!r.flags.contains(ObjectFlags::TRANSIENT) && kind.is_none_or(|k| r.kind == k)
			})
		})
	}

	/// Sets the class link of an instance.
	pub fn set_class(&mut self, id: ObjectId, class: ObjectId) -> Result<(), ObjectError> {
		self.record_mut(id)?.class = Some(class);
		Ok(())
	}

	pub fn set_flags(&mut self, id: ObjectId, flags: ObjectFlags) -> Result<(), ObjectError> {
		self.record_mut(id)?.flags.insert(flags);
		Ok(())
	}

	pub fn clear_flags(&mut self, id: ObjectId, flags: ObjectFlags) -> Result<(), ObjectError> {
		self.record_mut(id)?.flags.remove(flags);
		Ok(())
	}

	/// Removes mark flags, returning the slot flags they translate to.
	pub fn take_slot_marks(&mut self, id: ObjectId) -> Result<crate::InternalFlags, ObjectError> {
		Ok(self.record_mut(id)?.flags.take_slot_marks())
	}

	/// Returns `base` if free in `container`, otherwise `base_N` for the smallest free N.
	pub fn make_unique_name(&self, names: &mut NameTable, container: ContainerId, base: &str) -> Name {
		let candidate = names.intern(base);
		if !candidate.is_none() && self.find(container, candidate).is_none() {
			return candidate;
		}
		let mut suffix = 0usize;
		loop {
			let candidate = names.intern(&format!("{base}_{suffix}"));
			if self.find(container, candidate).is_none() {
				return candidate;
			}
			suffix += 1;
		}
	}

	/// Drops every slot binding and returns the slots that were held. Names and
	/// containers stay, so objects can be bound to fresh slots later.
	pub fn detach_slots(&mut self) -> Vec<(ObjectId, InternalIndex)> {
		self.records
			.iter_mut()
			.enumerate()
			.filter_map(|(i, r)| r.index.take().map(|index| (ObjectId::from_usize(i), index)))
			.collect()
	}

	/// Binds a named object that lost its slot to `index`.
	pub fn attach_slot(&mut self, id: ObjectId, index: InternalIndex) -> Result<(), ObjectError> {
		let record = self.record_mut(id)?;
		if record.name.is_none() {
			return Err(ObjectError::EmptyName(id));
		}
		record.index = Some(index);
		Ok(())
	}

	/// Iterates every record in allocation order.
	pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectRecord)> + '_ {
		self.records
			.iter()
			.enumerate()
			.map(|(i, r)| (ObjectId::from_usize(i), r))
	}
}

#[cfg(test)]
mod tests;
