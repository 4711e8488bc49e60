//! Dynamic types constructed on demand by path.

use std::sync::Arc;

use kiln_object::ObjectId;
use rustc_hash::FxHashMap as HashMap;

use crate::descriptor::TypeKind;
use crate::engine::Bootstrap;
use crate::error::BootstrapError;

/// Builds a dynamic type. Must return a named object of the registered kind.
pub type DynamicFactory = Arc<dyn Fn(&mut Bootstrap) -> Result<ObjectId, BootstrapError> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct DynamicEntry {
	pub(crate) kind: TypeKind,
	pub(crate) factory: DynamicFactory,
}

#[derive(Default)]
pub(crate) struct DynamicTypes {
	entries: HashMap<Box<str>, DynamicEntry>,
}

impl DynamicTypes {
	/// Registers a factory; returns `false` when it replaced an earlier one.
	pub(crate) fn insert(&mut self, path: &str, kind: TypeKind, factory: DynamicFactory) -> bool {
		self.entries
			.insert(path.into(), DynamicEntry { kind, factory })
			.is_none()
	}

	pub(crate) fn get(&self, path: &str) -> Option<&DynamicEntry> {
		self.entries.get(path)
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}
}

impl std::fmt::Debug for DynamicTypes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map()
			.entries(self.entries.iter().map(|(path, e)| (path, e.kind)))
			.finish()
	}
}

/// Splits `container.name` at the last dot. Paths without a dot are all name.
pub(crate) fn split_path(path: &str) -> (&str, &str) {
	path.rsplit_once('.').unwrap_or(("", path))
}
