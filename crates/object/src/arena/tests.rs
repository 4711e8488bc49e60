use pretty_assertions::assert_eq;

use super::*;
use crate::ids::InternalIndex;

struct Fixture {
	names: NameTable,
	arena: ObjectArena,
	next_slot: u32,
}

impl Fixture {
	fn new() -> Self {
		Self {
			names: NameTable::new(),
			arena: ObjectArena::new(),
			next_slot: 0,
		}
	}

	fn slot(&mut self) -> InternalIndex {
		self.next_slot += 1;
		InternalIndex::from_u32(self.next_slot - 1)
	}

	fn named(&mut self, kind: ObjectKind, container: u32, name: &str) -> ObjectId {
		let id = self.arena.allocate(kind, ObjectFlags::PUBLIC);
		let name = self.names.intern(name);
		let slot = self.slot();
		self.arena
			.add_object(id, name, ContainerId::from_u32(container), slot)
			.expect("name is free");
		id
	}
}

#[test]
fn unnamed_objects_are_not_hashed() {
	let mut fx = Fixture::new();
	let id = fx.arena.allocate(ObjectKind::Class, ObjectFlags::empty());
	let record = fx.arena.get(id).unwrap();
	assert!(!record.is_named());
	assert_eq!(record.index(), None);

	let actor = fx.names.intern("Actor");
	assert_eq!(fx.arena.find_any(actor, None), None);

	let slot = fx.slot();
	fx.arena.add_object(id, actor, ContainerId::from_u32(0), slot).unwrap();
	assert_eq!(fx.arena.find(ContainerId::from_u32(0), actor), Some(id));
	assert!(fx.arena.get(id).unwrap().is_named());
}

#[test]
fn name_collisions_are_rejected() {
	let mut fx = Fixture::new();
	let first = fx.named(ObjectKind::Struct, 0, "Vector");
	let second = fx.arena.allocate(ObjectKind::Struct, ObjectFlags::empty());
	let vector = fx.names.intern("Vector");
	let slot = fx.slot();
	let err = fx
		.arena
		.add_object(second, vector, ContainerId::from_u32(0), slot)
		.unwrap_err();
	assert_eq!(
		err,
		ObjectError::NameTaken {
			name: vector,
			container: ContainerId::from_u32(0),
			owner: first,
		}
	);

	// same name in another container is fine
	fx.arena.add_object(second, vector, ContainerId::from_u32(1), slot).unwrap();
}

#[test]
fn add_object_twice_fails() {
	let mut fx = Fixture::new();
	let id = fx.named(ObjectKind::Enum, 0, "Color");
	let other = fx.names.intern("Shade");
	let slot = fx.slot();
	assert!(matches!(
		fx.arena.add_object(id, other, ContainerId::from_u32(0), slot),
		Err(ObjectError::AlreadyNamed { .. })
	));
	assert_eq!(
		fx.arena.add_object(ObjectId::from_u32(42), other, ContainerId::from_u32(0), slot),
		Err(ObjectError::UnknownObject(ObjectId::from_u32(42)))
	);
}

#[test]
fn rename_moves_between_containers() {
	let mut fx = Fixture::new();
	let id = fx.named(ObjectKind::Class, 0, "Pawn");
	let pawn = fx.names.intern("Pawn");
	let retired = fx.names.intern("HOTRELOADED_Pawn");
	fx.arena.rename(id, retired, Some(ContainerId::from_u32(9))).unwrap();

	assert_eq!(fx.arena.find(ContainerId::from_u32(0), pawn), None);
	assert_eq!(fx.arena.find(ContainerId::from_u32(9), retired), Some(id));
	assert_eq!(fx.arena.find_any(pawn, None), None);
}

#[test]
fn find_any_skips_transient_and_filters_kind() {
	let mut fx = Fixture::new();
	let old = fx.named(ObjectKind::Class, 0, "Widget");
	let fresh = fx.named(ObjectKind::Class, 1, "Widget");
	let widget = fx.names.intern("Widget");
	assert_eq!(fx.arena.find_any(widget, Some(ObjectKind::Class)), Some(old));
	assert_eq!(fx.arena.find_any(widget, Some(ObjectKind::Enum)), None);

	fx.arena.set_flags(old, ObjectFlags::TRANSIENT).unwrap();
	assert_eq!(fx.arena.find_any(widget, None), Some(fresh));
}

#[test]
fn unique_names_append_suffixes() {
	let mut fx = Fixture::new();
	fx.named(ObjectKind::Class, 3, "HOTRELOADED_Pawn");
	fx.named(ObjectKind::Class, 3, "HOTRELOADED_Pawn_0");
	let unique = fx
		.arena
		.make_unique_name(&mut fx.names, ContainerId::from_u32(3), "HOTRELOADED_Pawn");
	assert_eq!(fx.names.resolve(unique), "HOTRELOADED_Pawn_1");

	let free = fx
		.arena
		.make_unique_name(&mut fx.names, ContainerId::from_u32(4), "HOTRELOADED_Pawn");
	assert_eq!(fx.names.resolve(free), "HOTRELOADED_Pawn");
}

#[test]
fn detached_objects_keep_names_until_reattached() {
	let mut fx = Fixture::new();
	let actor = fx.named(ObjectKind::Class, 1, "Actor");
	let unnamed = fx.arena.allocate(ObjectKind::Instance, ObjectFlags::empty());

	let detached = fx.arena.detach_slots();
	assert_eq!(detached, vec![(actor, InternalIndex::from_u32(0))]);
	assert_eq!(fx.arena.get(actor).unwrap().index(), None);
	assert!(fx.arena.get(actor).unwrap().is_named());
	assert_eq!(fx.arena.find(ContainerId::from_u32(1), fx.names.get("Actor").unwrap()), Some(actor));
	assert!(fx.arena.detach_slots().is_empty());

	fx.arena.attach_slot(actor, InternalIndex::from_u32(7)).unwrap();
	assert_eq!(fx.arena.get(actor).unwrap().index(), Some(InternalIndex::from_u32(7)));
	assert_eq!(fx.arena.attach_slot(unnamed, InternalIndex::from_u32(8)), Err(ObjectError::EmptyName(unnamed)));
}
