//! Storage slots for objects.
//!
//! # Role
//!
//! The GC object array assigns every named object a slot and keeps per-slot
//! flags (root set, native, async). The bootstrap engine only sees it through
//! [`ObjectIndex`], so a host can substitute its own allocator.
//!
//! # Disregard-for-GC region
//!
//! Slots handed out while the region is open form a contiguous prefix of the
//! array. Objects there are permanent: the collector never visits them, so they
//! must also be part of the root set. The region closes explicitly at the end of
//! the initial load, or implicitly when its budget runs out.

use tracing::{debug, info, warn};

use crate::error::ObjectError;
use crate::flags::InternalFlags;
use crate::ids::{InternalIndex, ObjectId};

/// Storage/index collaborator consumed by the bootstrap engine.
pub trait ObjectIndex {
	/// Sizes the storage and marks it ready.
	fn allocate_object_pool(&mut self, config: ObjectPoolConfig);

	/// Drops every slot and marks the storage not ready.
	fn shutdown(&mut self);

	/// Whether slots can be allocated yet.
	fn is_ready(&self) -> bool;

	/// Assigns a slot to `object`.
	fn allocate_index(&mut self, object: ObjectId) -> Result<InternalIndex, ObjectError>;

	/// Releases a slot.
	fn free_index(&mut self, index: InternalIndex) -> Result<(), ObjectError>;

	/// Whether `index` refers to a live slot.
	fn is_valid_index(&self, index: InternalIndex) -> bool;

	/// The object occupying `index`.
	fn object_at(&self, index: InternalIndex) -> Option<ObjectId>;

	/// Adds flags to a live slot.
	fn set_flags(&mut self, index: InternalIndex, flags: InternalFlags) -> Result<(), ObjectError>;

	/// Removes flags from a live slot.
	fn clear_flags(&mut self, index: InternalIndex, flags: InternalFlags) -> Result<(), ObjectError>;

	/// Flags of a live slot.
	fn flags(&self, index: InternalIndex) -> Option<InternalFlags>;

	/// Whether `index` lies in the disregard-for-GC region.
	fn is_disregard_for_gc(&self, index: InternalIndex) -> bool;

	/// Whether new slots still land in the disregard-for-GC region.
	fn is_open_for_disregard_for_gc(&self) -> bool;

	/// Closes the disregard-for-GC region.
	fn close_disregard_for_gc(&mut self);
}

/// Sizing for [`ObjectIndex::allocate_object_pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPoolConfig {
	/// Upper bound on live slots.
	pub max_objects: usize,
	/// Budget of the disregard-for-GC region; zero disables it.
	pub max_objects_not_considered_by_gc: usize,
	/// Reserve memory for every slot up front.
	pub pre_allocate: bool,
}

impl Default for ObjectPoolConfig {
	fn default() -> Self {
		Self {
			max_objects: 2 * 1024 * 1024,
			max_objects_not_considered_by_gc: 0,
			pre_allocate: false,
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct Slot {
	object: ObjectId,
	flags: InternalFlags,
}

/// In-memory GC object array.
#[derive(Debug, Default)]
pub struct GcObjectArray {
	slots: Vec<Option<Slot>>,
	free: Vec<u32>,
	live: usize,
	max_objects: usize,
	disregard_budget: usize,
	disregard_len: usize,
	open_for_disregard: bool,
	ready: bool,
}

impl GcObjectArray {
	/// Creates an array that is not ready; call [`ObjectIndex::allocate_object_pool`].
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of live slots.
	pub fn len(&self) -> usize {
		self.live
	}

	/// True when no slot is live.
	pub fn is_empty(&self) -> bool {
		self.live == 0
	}

	/// Number of slots in the disregard-for-GC region.
	pub fn disregard_len(&self) -> usize {
		self.disregard_len
	}

	fn slot(&self, index: InternalIndex) -> Option<&Slot> {
		self.slots.get(index.as_usize()).and_then(Option::as_ref)
	}

	fn slot_mut(&mut self, index: InternalIndex) -> Result<&mut Slot, ObjectError> {
		self.slots
			.get_mut(index.as_usize())
			.and_then(Option::as_mut)
			.ok_or(ObjectError::InvalidIndex(index))
	}
}

impl ObjectIndex for GcObjectArray {
	fn allocate_object_pool(&mut self, config: ObjectPoolConfig) {
		self.max_objects = config.max_objects;
		self.disregard_budget = config.max_objects_not_considered_by_gc;
		self.open_for_disregard = config.max_objects_not_considered_by_gc > 0;
		if config.pre_allocate {
			self.slots.reserve(config.max_objects);
		}
		self.ready = true;
		info!(
			max_objects = config.max_objects,
			disregard_budget = config.max_objects_not_considered_by_gc,
			pre_allocate = config.pre_allocate,
			"object array ready"
		);
	}

	fn shutdown(&mut self) {
		self.slots.clear();
		self.free.clear();
		self.live = 0;
		self.disregard_len = 0;
		self.open_for_disregard = false;
		self.ready = false;
	}

	fn is_ready(&self) -> bool {
		self.ready
	}

	fn allocate_index(&mut self, object: ObjectId) -> Result<InternalIndex, ObjectError> {
		if !self.ready {
			return Err(ObjectError::NotReady);
		}
		if self.live >= self.max_objects {
			return Err(ObjectError::ArrayFull {
				max: self.max_objects,
			});
		}

		let slot = Some(Slot {
			object,
			flags: InternalFlags::empty(),
		});

		if self.open_for_disregard {
			if self.disregard_len < self.disregard_budget {
				let index = InternalIndex::from_usize(self.slots.len());
				self.slots.push(slot);
				self.disregard_len += 1;
				self.live += 1;
				return Ok(index);
			}
			warn!(
				budget = self.disregard_budget,
				"disregard-for-GC budget exhausted, closing region"
			);
			self.close_disregard_for_gc();
		}

		let index = match self.free.pop() {
			Some(raw) => {
				let index = InternalIndex::from_u32(raw);
				self.slots[index.as_usize()] = slot;
				index
			}
			None => {
				let index = InternalIndex::from_usize(self.slots.len());
				self.slots.push(slot);
				index
			}
		};
		self.live += 1;
		Ok(index)
	}

	fn free_index(&mut self, index: InternalIndex) -> Result<(), ObjectError> {
		if self.is_disregard_for_gc(index) {
			return Err(ObjectError::PermanentSlot(index));
		}
		let entry = self
			.slots
			.get_mut(index.as_usize())
			.ok_or(ObjectError::InvalidIndex(index))?;
		if entry.take().is_none() {
			return Err(ObjectError::InvalidIndex(index));
		}
		self.free.push(index.as_u32());
		self.live -= 1;
		Ok(())
	}

	fn is_valid_index(&self, index: InternalIndex) -> bool {
		self.slot(index).is_some()
	}

	fn object_at(&self, index: InternalIndex) -> Option<ObjectId> {
		self.slot(index).map(|s| s.object)
	}

	fn set_flags(&mut self, index: InternalIndex, flags: InternalFlags) -> Result<(), ObjectError> {
		self.slot_mut(index)?.flags.insert(flags);
		Ok(())
	}

	fn clear_flags(&mut self, index: InternalIndex, flags: InternalFlags) -> Result<(), ObjectError> {
		self.slot_mut(index)?.flags.remove(flags);
		Ok(())
	}

	fn flags(&self, index: InternalIndex) -> Option<InternalFlags> {
		self.slot(index).map(|s| s.flags)
	}

	fn is_disregard_for_gc(&self, index: InternalIndex) -> bool {
		index.as_usize() < self.disregard_len
	}

	fn is_open_for_disregard_for_gc(&self) -> bool {
		self.open_for_disregard
	}

	fn close_disregard_for_gc(&mut self) {
		if self.open_for_disregard {
			debug!(slots = self.disregard_len, "closing disregard-for-GC region");
		}
		self.open_for_disregard = false;
	}
}
