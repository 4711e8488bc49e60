//! Published type catalog.
//!
//! The engine is single-threaded, but readers elsewhere in the process want to
//! look types up without borrowing it. At the end of every outermost epoch the
//! engine builds an immutable [`TypeCatalog`] and swaps it into a shared
//! [`CatalogHandle`]; readers load whichever snapshot is current.

use std::sync::Arc;

use arc_swap::ArcSwap;
use kiln_object::ObjectId;
use rustc_hash::FxHashMap as HashMap;

use crate::descriptor::TypeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
	pub id: ObjectId,
	pub kind: TypeKind,
	pub container: Box<str>,
	pub name: Box<str>,
	pub super_type: Option<ObjectId>,
	pub default_instance: Option<ObjectId>,
}

impl CatalogEntry {
	/// `container.name`.
	pub fn path(&self) -> String {
		format!("{}.{}", self.container, self.name)
	}
}

/// Immutable snapshot of every live, non-retired type.
#[derive(Debug, Default)]
pub struct TypeCatalog {
	epoch: u64,
	entries: Vec<CatalogEntry>,
	by_path: HashMap<Box<str>, usize>,
}

impl TypeCatalog {
	pub(crate) fn build(epoch: u64, entries: Vec<CatalogEntry>) -> Self {
		let by_path = entries
			.iter()
			.enumerate()
			.map(|(i, e)| (e.path().into_boxed_str(), i))
			.collect();
		Self {
			epoch,
			entries,
			by_path,
		}
	}

	/// Epoch that published this snapshot; zero before the first epoch.
	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub fn get(&self, container: &str, name: &str) -> Option<&CatalogEntry> {
		self.by_path
			.get(format!("{container}.{name}").as_str())
			.map(|&i| &self.entries[i])
	}

	pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Shared, cloneable reader of the current [`TypeCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogHandle {
	current: Arc<ArcSwap<TypeCatalog>>,
}

impl Default for CatalogHandle {
	fn default() -> Self {
		Self {
			current: Arc::new(ArcSwap::from_pointee(TypeCatalog::default())),
		}
	}
}

impl CatalogHandle {
	pub fn load(&self) -> Arc<TypeCatalog> {
		self.current.load_full()
	}

	pub(crate) fn publish(&self, catalog: TypeCatalog) {
		self.current.store(Arc::new(catalog));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(id: u32, name: &str) -> CatalogEntry {
		CatalogEntry {
			id: ObjectId::from_u32(id),
			kind: TypeKind::Class,
			container: "/Script/Engine".into(),
			name: name.into(),
			super_type: None,
			default_instance: None,
		}
	}

	#[test]
	fn handles_observe_new_snapshots() {
		let handle = CatalogHandle::default();
		let reader = handle.clone();
		let before = reader.load();
		assert!(before.is_empty());

		handle.publish(TypeCatalog::build(3, vec![entry(1, "Actor"), entry(2, "Pawn")]));
		let after = reader.load();
		assert_eq!(after.epoch(), 3);
		assert_eq!(after.get("/Script/Engine", "Pawn").map(|e| e.id), Some(ObjectId::from_u32(2)));
		assert!(after.get("/Script/Game", "Pawn").is_none());
		// old snapshots stay valid
		assert_eq!(before.epoch(), 0);
	}
}
