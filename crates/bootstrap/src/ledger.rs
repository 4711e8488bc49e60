//! Pending registrants.
//!
//! Objects that exist before their names can be assigned are recorded here: a
//! map from identity to (name, container), plus the arrival order. The map is
//! the source of truth. The order list may still reference objects that were
//! named on demand in the meantime; consumers skip those.

use kiln_object::{Name, ObjectId};
use rustc_hash::FxHashMap as HashMap;

/// Deferred name and container of a pending registrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingInfo {
	pub name: Name,
	pub container: Name,
}

/// An object registered itself twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{id} is already pending")]
pub struct DuplicateRegistrant {
	pub id: ObjectId,
	pub existing: PendingInfo,
}

/// Identity → info map plus FIFO of arrivals.
#[derive(Debug, Default)]
pub struct PendingLedger {
	info: HashMap<ObjectId, PendingInfo>,
	order: Vec<ObjectId>,
}

impl PendingLedger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `info` and appends `id` to the arrival order.
	pub fn enqueue(&mut self, id: ObjectId, info: PendingInfo) -> Result<(), DuplicateRegistrant> {
		self.record(id, info)?;
		self.order.push(id);
		Ok(())
	}

	/// Records `info` without queueing; used for registrants held per module.
	pub fn record(&mut self, id: ObjectId, info: PendingInfo) -> Result<(), DuplicateRegistrant> {
		if let Some(&existing) = self.info.get(&id) {
			return Err(DuplicateRegistrant { id, existing });
		}
		self.info.insert(id, info);
		Ok(())
	}

	/// Appends previously recorded registrants to the arrival order.
	pub fn push_order(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
		self.order.extend(ids);
	}

	/// Detaches the whole arrival order; new arrivals start a fresh list.
	pub fn dequeue_all(&mut self) -> Vec<ObjectId> {
		std::mem::take(&mut self.order)
	}

	/// Removes and returns the info for `id`. `None` means the object was
	/// already processed or never registered.
	pub fn consume(&mut self, id: ObjectId) -> Option<PendingInfo> {
		self.info.remove(&id)
	}

	pub fn get(&self, id: ObjectId) -> Option<&PendingInfo> {
		self.info.get(&id)
	}

	/// Lowest pending identity declared under `name`, in any container.
	pub fn find_by_name(&self, name: Name) -> Option<ObjectId> {
		self.info
			.iter()
			.filter(|(_, info)| info.name == name)
			.map(|(&id, _)| id)
			.min()
	}

	/// Whether the arrival order is empty.
	pub fn is_queue_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Number of registrants not yet consumed.
	pub fn len(&self) -> usize {
		self.info.len()
	}

	pub fn is_empty(&self) -> bool {
		self.info.is_empty()
	}
}
