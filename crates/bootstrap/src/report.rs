//! Epoch summaries.

use std::ops::{Add, AddAssign};

/// Work done in one epoch, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
	/// Pending registrants that received their name.
	pub registrants: usize,
	pub enums: usize,
	pub structs: usize,
	pub classes: usize,
	pub default_instances: usize,
}

impl KindCounts {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	/// Types materialized, any kind.
	pub fn types(&self) -> usize {
		self.enums + self.structs + self.classes
	}
}

impl Add for KindCounts {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Self {
			registrants: self.registrants + rhs.registrants,
			enums: self.enums + rhs.enums,
			structs: self.structs + rhs.structs,
			classes: self.classes + rhs.classes,
			default_instances: self.default_instances + rhs.default_instances,
		}
	}
}

impl AddAssign for KindCounts {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
	Warning,
	Error,
}

/// Soft problem reported while building a default instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyIssue {
	/// Path of the class whose default instance reported it.
	pub class: String,
	pub severity: IssueSeverity,
	pub message: String,
}

/// Outcome of [`crate::Bootstrap::materialize_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochReport {
	pub epoch: u64,
	/// Reentrant call: only queues were drained, the epoch continues outside.
	pub nested: bool,
	/// Fixed-point passes run.
	pub passes: usize,
	pub counts: KindCounts,
	/// Containers whose module bucket was released during the epoch.
	pub released_modules: Vec<String>,
	/// GC reference metadata was assembled at the end of this epoch.
	pub gc_assembled: bool,
	pub issues: Vec<PropertyIssue>,
}

impl EpochReport {
	/// Nothing was materialized.
	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_accumulate() {
		let mut total = KindCounts::default();
		assert!(total.is_empty());
		total += KindCounts {
			enums: 1,
			classes: 2,
			..Default::default()
		};
		total += KindCounts {
			structs: 3,
			..Default::default()
		};
		assert_eq!(total.types(), 6);
		assert!(!total.is_empty());
	}
}
