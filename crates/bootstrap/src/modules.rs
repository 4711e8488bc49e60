//! Per-module holding area.
//!
//! With per-module bootstrap enabled, registrants of a module wait here until
//! the host reports that module as loaded. Buckets are keyed by container name
//! and keep first-registration order.

use indexmap::IndexMap;
use kiln_object::{Name, ObjectId};

/// Diagnostic view of one held bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingModule {
	pub container: String,
	pub registrants: usize,
}

#[derive(Debug, Default)]
pub struct ModuleHoldingArea {
	buckets: IndexMap<Name, Vec<ObjectId>>,
}

impl ModuleHoldingArea {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn hold(&mut self, container: Name, id: ObjectId) {
		self.buckets.entry(container).or_default().push(id);
	}

	/// Removes a bucket, returning its registrants. Unknown containers yield
	/// an empty list.
	pub fn release(&mut self, container: Name) -> Vec<ObjectId> {
		self.buckets.shift_remove(&container).unwrap_or_default()
	}

	/// Removes every bucket in first-registration order.
	pub fn release_all(&mut self) -> Vec<(Name, Vec<ObjectId>)> {
		self.buckets.drain(..).collect()
	}

	/// Held buckets with their sizes.
	pub fn iter(&self) -> impl Iterator<Item = (Name, usize)> + '_ {
		self.buckets.iter().map(|(&name, ids)| (name, ids.len()))
	}

	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}

	pub fn len(&self) -> usize {
		self.buckets.len()
	}
}
