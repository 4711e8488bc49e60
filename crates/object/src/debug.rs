//! Naming helpers for logs and debugger sessions.

use crate::arena::ObjectArena;
use crate::container::ContainerProvider;
use crate::ids::ObjectId;
use crate::name::NameTable;

const NONE: &str = "None";

/// Short name of an object, `"None"` when absent or unnamed.
pub fn debug_name(arena: &ObjectArena, names: &NameTable, object: Option<ObjectId>) -> String {
	object
		.and_then(|id| arena.get(id))
		.map(|r| names.resolve(r.name()).to_owned())
		.unwrap_or_else(|| NONE.to_owned())
}

/// Dotted path, outermost container first: `/Script/Engine.Actor`.
pub fn debug_path_name(
	arena: &ObjectArena,
	names: &NameTable,
	containers: &dyn ContainerProvider,
	object: Option<ObjectId>,
) -> String {
	let Some(record) = object.and_then(|id| arena.get(id)) else {
		return NONE.to_owned();
	};
	let leaf = names.resolve(record.name());
	match record.container().and_then(|c| containers.name_of(c)) {
		Some(container) => format!("{}.{}", names.resolve(container), leaf),
		None => leaf.to_owned(),
	}
}

/// Class name followed by the path name: `Class /Script/Engine.Actor`.
pub fn debug_full_name(
	arena: &ObjectArena,
	names: &NameTable,
	containers: &dyn ContainerProvider,
	object: Option<ObjectId>,
) -> String {
	let Some(record) = object.and_then(|id| arena.get(id)) else {
		return NONE.to_owned();
	};
	let class_name = match record.class() {
		Some(class) => debug_name(arena, names, Some(class)),
		None => record.kind().meta_class_name().to_owned(),
	};
	format!(
		"{} {}",
		class_name,
		debug_path_name(arena, names, containers, object)
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::arena::ObjectKind;
	use crate::container::ContainerTable;
	use crate::flags::ObjectFlags;
	use crate::ids::InternalIndex;

	#[test]
	fn names_paths_and_full_names() {
		let mut names = NameTable::new();
		let mut containers = ContainerTable::new();
		let mut arena = ObjectArena::new();

		let engine = containers.get_or_create(names.intern("/Script/Engine"));
		let class = arena.allocate(ObjectKind::Class, ObjectFlags::empty());
		arena
			.add_object(class, names.intern("Actor"), engine, InternalIndex::from_u32(0))
			.unwrap();
		let cdo = arena.allocate(ObjectKind::Instance, ObjectFlags::CLASS_DEFAULT_OBJECT);
		arena
			.add_object(cdo, names.intern("Default__Actor"), engine, InternalIndex::from_u32(1))
			.unwrap();
		arena.set_class(cdo, class).unwrap();

		assert_eq!(debug_name(&arena, &names, Some(class)), "Actor");
		assert_eq!(
			debug_path_name(&arena, &names, &containers, Some(class)),
			"/Script/Engine.Actor"
		);
		assert_eq!(
			debug_full_name(&arena, &names, &containers, Some(class)),
			"Class /Script/Engine.Actor"
		);
		assert_eq!(
			debug_full_name(&arena, &names, &containers, Some(cdo)),
			"Actor /Script/Engine.Default__Actor"
		);
	}

	#[test]
	fn absent_objects_print_none() {
		let names = NameTable::new();
		let containers = ContainerTable::new();
		let arena = ObjectArena::new();
		assert_eq!(debug_name(&arena, &names, None), "None");
		assert_eq!(debug_path_name(&arena, &names, &containers, None), "None");
		assert_eq!(
			debug_full_name(&arena, &names, &containers, Some(ObjectId::from_u32(5))),
			"None"
		);
	}
}
