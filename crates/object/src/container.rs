use rustc_hash::FxHashMap as HashMap;

use crate::flags::ContainerFlags;
use crate::ids::ContainerId;
use crate::name::Name;

/// Container ("package") collaborator consumed by the bootstrap engine.
pub trait ContainerProvider {
	/// Returns the container named `name`, creating it on first use.
	fn get_or_create(&mut self, name: Name) -> ContainerId;

	/// Returns the container named `name` if it exists.
	fn find(&self, name: Name) -> Option<ContainerId>;

	/// Returns the name of a container.
	fn name_of(&self, id: ContainerId) -> Option<Name>;

	/// Adds flags to a container. Unknown ids are ignored.
	fn set_flags(&mut self, id: ContainerId, flags: ContainerFlags);

	/// Flags of a container; empty for unknown ids.
	fn flags(&self, id: ContainerId) -> ContainerFlags;
}

#[derive(Debug, Clone, Copy)]
struct ContainerEntry {
	name: Name,
	flags: ContainerFlags,
}

/// In-memory container table.
#[derive(Debug, Default, Clone)]
pub struct ContainerTable {
	entries: Vec<ContainerEntry>,
	by_name: HashMap<Name, ContainerId>,
}

impl ContainerTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of containers created so far.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when no container exists.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates containers in creation order.
	pub fn iter(&self) -> impl Iterator<Item = (ContainerId, Name)> + '_ {
		self.entries
			.iter()
			.enumerate()
			.map(|(i, e)| (ContainerId::from_usize(i), e.name))
	}
}

impl ContainerProvider for ContainerTable {
	fn get_or_create(&mut self, name: Name) -> ContainerId {
		if let Some(&id) = self.by_name.get(&name) {
			return id;
		}
		let id = ContainerId::from_usize(self.entries.len());
		self.entries.push(ContainerEntry {
			name,
			flags: ContainerFlags::empty(),
		});
		self.by_name.insert(name, id);
		id
	}

	fn find(&self, name: Name) -> Option<ContainerId> {
		self.by_name.get(&name).copied()
	}

	fn name_of(&self, id: ContainerId) -> Option<Name> {
		self.entries.get(id.as_usize()).map(|e| e.name)
	}

	fn set_flags(&mut self, id: ContainerId, flags: ContainerFlags) {
		if let Some(entry) = self.entries.get_mut(id.as_usize()) {
			entry.flags.insert(flags);
		}
	}

	fn flags(&self, id: ContainerId) -> ContainerFlags {
		self.entries
			.get(id.as_usize())
			.map(|e| e.flags)
			.unwrap_or_default()
	}
}
