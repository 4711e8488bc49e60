//! Machine-checkable invariant proofs for the bootstrap engine.
//!
//! Each invariant is a `pub(crate) fn test_*()` that runs as a test and is
//! referenced from the crate-level docs.

use kiln_object::{InternalFlags, ObjectFlags, ObjectKind};

use crate::{Bootstrap, BootstrapConfig, BootstrapError, TypeSpec};

const CORE: &str = "/Script/CoreUObject";
const GAME: &str = "/Script/Game";

fn booted(config: BootstrapConfig) -> Bootstrap {
	let mut boot = Bootstrap::new(config);
	boot.init_object_system().unwrap();
	boot
}

/// Invariant: forcing a registrant that was already processed is a no-op.
#[cfg_attr(test, test)]
pub(crate) fn test_force_materialize_is_idempotent() {
	let mut boot = Bootstrap::new(BootstrapConfig::default());
	let class = boot.declare_class(TypeSpec::class(CORE, "Object")).unwrap();
	boot.init_object_system().unwrap();

	// init already named it
	assert!(!boot.force_materialize(class).unwrap());
	assert!(!boot.force_materialize(class).unwrap());
	assert!(boot.objects().get(class).unwrap().is_named());

	let late = boot.declare_class(TypeSpec::class(GAME, "Late")).unwrap();
	assert!(boot.force_materialize(late).unwrap());
	assert!(!boot.force_materialize(late).unwrap());

	// its FIFO entry is now stale and must be skipped
	let report = boot.materialize_all().unwrap();
	assert_eq!(report.counts.registrants, 0);
	assert_eq!(report.counts.classes, 2);
}

/// Invariant: `materialize_all` returns only when every queue is empty, even
/// when default-instance hooks keep declaring types.
#[cfg_attr(test, test)]
pub(crate) fn test_fixed_point_quiesces() {
	let mut boot = booted(BootstrapConfig::default());
	boot.declare(TypeSpec::class(GAME, "Spawner").with_defaults(|boot, _| {
		boot.declare(TypeSpec::enumeration(GAME, "SpawnedMode"))?;
		boot.declare(TypeSpec::class(GAME, "Spawned").with_defaults(|boot, _| {
			boot.declare(TypeSpec::structure(GAME, "SpawnedData"))
		}))
	}))
	.unwrap();

	let report = boot.materialize_all().unwrap();
	assert!(report.passes >= 3);
	assert_eq!(report.counts.classes, 2);
	assert_eq!(report.counts.default_instances, 2);
	assert_eq!(report.counts.enums, 1);
	assert_eq!(report.counts.structs, 1);
	for name in ["Spawner", "Spawned", "SpawnedMode", "SpawnedData"] {
		assert!(boot.find_type(GAME, name).is_some(), "{name} missing");
	}
	assert_eq!(boot.pending_registrants(), 0);
	assert!(boot.materialize_all().unwrap().is_empty());
}

/// Invariant: GC metadata is assembled once per epoch that constructed
/// classes, never for an epoch without classes, and never in the initial load.
#[cfg_attr(test, test)]
pub(crate) fn test_gc_assembly_once_per_epoch() {
	let mut boot = booted(BootstrapConfig::default());
	boot.declare(TypeSpec::class(CORE, "Object")).unwrap();
	boot.declare(TypeSpec::class(CORE, "Field").with_super("Object")).unwrap();
	let initial = boot.materialize_all().unwrap();
	assert_eq!(initial.counts.classes, 2);
	assert!(!initial.gc_assembled);
	assert_eq!(boot.gc().assembly_count(), 0);

	boot.end_initial_load().unwrap();
	assert_eq!(boot.gc().assembly_count(), 1);
	assert_eq!(boot.gc().len(), 2);

	boot.declare(TypeSpec::class(GAME, "Hero").with_super("Object")).unwrap();
	let steady = boot.materialize_all().unwrap();
	assert!(steady.gc_assembled);
	assert_eq!(boot.gc().assembly_count(), 2);

	boot.declare(TypeSpec::structure(GAME, "Stats")).unwrap();
	let no_classes = boot.materialize_all().unwrap();
	assert!(!no_classes.gc_assembled);
	assert_eq!(boot.gc().assembly_count(), 2);
}

/// Invariant: within a pass, enums run before structs and structs before
/// classes, whatever the declaration order.
#[cfg_attr(test, test)]
pub(crate) fn test_kind_order_within_a_pass() {
	use std::sync::Arc;

	use parking_lot::Mutex;

	use crate::{RegistrationKind, RegistrationPhase};

	let mut boot = booted(BootstrapConfig::default());
	let order = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&order);
	boot.on_registration(move |event| {
		if event.phase == RegistrationPhase::Started && event.kind != RegistrationKind::ClassDefault {
			sink.lock().push(event.kind);
		}
	});

	boot.declare(TypeSpec::class(GAME, "C")).unwrap();
	boot.declare(TypeSpec::structure(GAME, "S")).unwrap();
	boot.declare(TypeSpec::enumeration(GAME, "E")).unwrap();
	boot.declare(TypeSpec::structure(GAME, "S2")).unwrap();
	boot.materialize_all().unwrap();

	assert_eq!(
		*order.lock(),
		vec![
			RegistrationKind::Enum,
			RegistrationKind::Struct,
			RegistrationKind::Struct,
			RegistrationKind::Class,
		]
	);
}

/// Invariant: objects in the disregard-for-GC region are always rooted.
#[cfg_attr(test, test)]
pub(crate) fn test_disregarded_objects_are_rooted() {
	let mut boot = booted(BootstrapConfig {
		max_objects_not_considered_by_gc: 64,
		..BootstrapConfig::default()
	});
	boot.declare(TypeSpec::enumeration(CORE, "Mode")).unwrap();
	boot.declare(TypeSpec::class(CORE, "Object")).unwrap();
	boot.materialize_all().unwrap();

	for (_, record) in boot.objects().iter() {
		let index = record.index().unwrap();
		assert!(boot.index().is_disregard_for_gc(index));
		assert!(boot.index().flags(index).unwrap().contains(InternalFlags::ROOT_SET));
	}

	// a host registrant without the root mark cannot land in the region
	let stray = boot.allocate_object(ObjectKind::Instance, ObjectFlags::PUBLIC);
	boot.register(stray, "Stray", CORE).unwrap();
	let err = boot.materialize_all().unwrap_err();
	assert!(matches!(err, BootstrapError::DisregardedNotRooted { .. }));
	assert!(boot.is_poisoned());
	assert_eq!(boot.materialize_all().unwrap_err(), BootstrapError::Poisoned);
}

/// Invariant: releasing a module twice, or one that holds nothing, moves
/// nothing the second time.
#[cfg_attr(test, test)]
pub(crate) fn test_module_release_is_idempotent() {
	let mut boot = Bootstrap::new(BootstrapConfig {
		per_module_bootstrap: true,
		..BootstrapConfig::default()
	});
	let held = boot.allocate_object(ObjectKind::Instance, ObjectFlags::MARK_AS_ROOT_SET);
	boot.register(held, "Settings", GAME).unwrap();
	boot.init_object_system().unwrap();
	assert!(!boot.objects().get(held).unwrap().is_named());

	assert_eq!(boot.release_module("Game"), 1);
	assert_eq!(boot.release_module("Game"), 0);
	assert_eq!(boot.release_module("Unknown"), 0);
	let report = boot.materialize_all().unwrap();
	assert_eq!(report.counts.registrants, 1);
	assert_eq!(report.released_modules, vec![GAME.to_owned()]);
	assert!(boot.objects().get(held).unwrap().is_named());
}
