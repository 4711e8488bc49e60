//! Declarations, pending registrants and on-demand naming.

use kiln_object::{ContainerFlags, ContainerId, InternalFlags, Name, ObjectFlags, ObjectId, ObjectKind};
use tracing::{debug, info, trace};

use super::reload::Reconciled;
use super::{Bootstrap, registration_kind};
use crate::compiled_in::compiled_in;
use crate::config::module_container_name;
use crate::descriptor::{TypeDescriptor, TypeKind, TypeSpec};
use crate::error::BootstrapError;
use crate::events::{RegistrationKind, RegistrationPhase};
use crate::hot_reload::Reinstance;
use crate::ledger::PendingInfo;
use crate::modules::PendingModule;
use crate::types::RuntimeType;

/// Flags of compiled-in class objects.
const CLASS_FLAGS: ObjectFlags = ObjectFlags::PUBLIC
	.union(ObjectFlags::STANDALONE)
	.union(ObjectFlags::MARK_AS_NATIVE)
	.union(ObjectFlags::MARK_AS_ROOT_SET);

/// Flags of compiled-in enum and struct objects.
const TYPE_FLAGS: ObjectFlags = ObjectFlags::PUBLIC.union(ObjectFlags::MARK_AS_NATIVE);

pub(super) enum ClassSlot {
	/// Unchanged on hot reload; the existing class stays.
	Existing(ObjectId),
	/// Newly allocated, unnamed.
	Fresh(ObjectId),
}

impl Bootstrap {
	/// Declares a compiled-in type.
	///
	/// Enums and structs are queued for construction. Classes also get an
	/// unnamed class object registered as pending, see [`Self::declare_class`].
	pub fn declare(&mut self, spec: TypeSpec) -> Result<(), BootstrapError> {
		match spec.kind {
			TypeKind::Class => self.declare_class(spec).map(drop),
			kind => {
				self.ensure_healthy()?;
				let (container, name) = (spec.container.clone(), spec.name.clone());
				self.enqueue(TypeDescriptor::new(kind, &container, &name, move |boot| {
					boot.construct_type(spec)
				}));
				Ok(())
			}
		}
	}

	/// Declares a compiled-in class and returns its object.
	///
	/// The object exists immediately but stays unnamed until its registrant is
	/// processed. During a hot reload an unchanged class returns the existing
	/// object and nothing is queued.
	pub fn declare_class(&mut self, spec: TypeSpec) -> Result<ObjectId, BootstrapError> {
		self.ensure_healthy()?;
		let result = self.declare_class_inner(spec);
		self.guard(result)
	}

	fn declare_class_inner(&mut self, spec: TypeSpec) -> Result<ObjectId, BootstrapError> {
		let id = match self.prepare_class(&spec)? {
			ClassSlot::Existing(id) => return Ok(id),
			ClassSlot::Fresh(id) => id,
		};
		self.register_pending(id, &spec.name, &spec.container)?;
		let (container, name) = (spec.container.clone(), spec.name.clone());
		self.enqueue(TypeDescriptor::new(TypeKind::Class, &container, &name, move |boot| {
			boot.construct_class(id, spec)
		}));
		Ok(id)
	}

	/// Queues a descriptor for the next materialization pass.
	pub fn enqueue(&mut self, descriptor: TypeDescriptor) {
		let kind = descriptor.kind();
		if !self.events.is_empty() {
			self.emit(
				descriptor.container(),
				descriptor.name(),
				registration_kind(kind),
				RegistrationPhase::Added,
				false,
			);
			if kind == TypeKind::Class {
				let default_name = format!("Default__{}", descriptor.name());
				self.emit(
					descriptor.container(),
					&default_name,
					RegistrationKind::ClassDefault,
					RegistrationPhase::Added,
					false,
				);
			}
		}
		trace!(%kind, container = descriptor.container(), name = descriptor.name(), "descriptor queued");
		self.queues.push(descriptor);
	}

	/// Reserves an unnamed object, for hosts that register their own objects.
	pub fn allocate_object(&mut self, kind: ObjectKind, flags: ObjectFlags) -> ObjectId {
		self.objects.allocate(kind, flags)
	}

	/// Records a pending registrant: `object` receives `name` in `container`
	/// once processed.
	pub fn register(&mut self, object: ObjectId, name: &str, container: &str) -> Result<(), BootstrapError> {
		self.ensure_healthy()?;
		let result = self.register_pending(object, name, container);
		self.guard(result)
	}

	pub(super) fn register_pending(&mut self, id: ObjectId, name: &str, container: &str) -> Result<(), BootstrapError> {
		let info = PendingInfo {
			name: self.names.intern(name),
			container: self.names.intern(container),
		};
		let held = self.config.per_module_bootstrap && !self.config.is_always_global(container);
		let recorded = if held {
			self.ledger.record(id, info)
		} else {
			self.ledger.enqueue(id, info)
		};
		recorded.map_err(|dup| BootstrapError::DuplicateRegistrant {
			id,
			container: self.names.resolve(dup.existing.container).to_owned(),
			name: self.names.resolve(dup.existing.name).to_owned(),
		})?;
		if held {
			self.modules.hold(info.container, id);
		}
		trace!(%id, name, container, held, "pending registrant");
		Ok(())
	}

	/// Names a pending registrant now, ahead of its turn, releasing its module
	/// bucket first. Returns `false` when it was already processed or never
	/// registered.
	pub fn force_materialize(&mut self, object: ObjectId) -> Result<bool, BootstrapError> {
		self.ensure_healthy()?;
		let result = self.force_materialize_inner(object, true);
		self.guard(result)
	}

	pub(super) fn force_materialize_inner(
		&mut self,
		id: ObjectId,
		check_module_release: bool,
	) -> Result<bool, BootstrapError> {
		if !self.index.is_ready() {
			return match self.ledger.get(id) {
				Some(info) => Err(BootstrapError::NotInitialized {
					what: format!(
						"{}.{}",
						self.names.resolve(info.container),
						self.names.resolve(info.name)
					),
				}),
				None => Ok(false),
			};
		}
		let Some(info) = self.ledger.consume(id) else {
			return Ok(false);
		};
		if check_module_release && self.config.per_module_bootstrap {
			self.release_container(info.container);
		}
		self.deferred_register(id, info)?;
		Ok(true)
	}

	fn deferred_register(&mut self, id: ObjectId, info: PendingInfo) -> Result<(), BootstrapError> {
		let container = self.containers.get_or_create(info.container);
		self.containers.set_flags(container, ContainerFlags::COMPILED_IN);
		self.name_object(id, info.name, container, false)?;
		self.counts.registrants += 1;
		trace!(object = %self.path_name(id), "registered");
		Ok(())
	}

	/// Gives `id` its slot, name and container.
	///
	/// Mark flags become slot flags. Objects registered off the owner thread are
	/// marked async. With `auto_root`, an object landing in the disregard-for-GC
	/// region joins the root set; without it, such an object must already be
	/// marked for the root set.
	pub(super) fn name_object(
		&mut self,
		id: ObjectId,
		name: Name,
		container: ContainerId,
		auto_root: bool,
	) -> Result<(), BootstrapError> {
		let mut slot_flags = self.objects.take_slot_marks(id)?;
		if !self.is_owner_thread() {
			slot_flags |= InternalFlags::ASYNC;
		}
		let index = self.index.allocate_index(id)?;
		self.objects.add_object(id, name, container, index)?;

		let disregarded = self.index.is_disregard_for_gc(index);
		if disregarded && auto_root {
			slot_flags |= InternalFlags::ROOT_SET;
		}
		if !slot_flags.is_empty() {
			self.index.set_flags(index, slot_flags)?;
		}
		let rooted = self
			.index
			.flags(index)
			.is_some_and(|f| f.contains(InternalFlags::ROOT_SET));
		if disregarded && !rooted {
			return Err(BootstrapError::DisregardedNotRooted {
				path: self.path_name(id),
			});
		}
		Ok(())
	}

	/// Builds a type now instead of queueing it.
	///
	/// Enums and structs are created and named here. Classes go through the
	/// pending path so an unmaterialized super class is named first.
	pub fn construct_type(&mut self, spec: TypeSpec) -> Result<ObjectId, BootstrapError> {
		self.ensure_healthy()?;
		let result = match spec.kind {
			TypeKind::Class => match self.prepare_class(&spec) {
				Ok(ClassSlot::Existing(id)) => Ok(id),
				Ok(ClassSlot::Fresh(id)) => self
					.register_pending(id, &spec.name, &spec.container)
					.and_then(|()| self.construct_class(id, spec)),
				Err(err) => Err(err),
			},
			_ => self.construct_simple(spec),
		};
		self.guard(result)
	}

	fn construct_simple(&mut self, spec: TypeSpec) -> Result<ObjectId, BootstrapError> {
		let event_kind = registration_kind(spec.kind);
		self.emit(&spec.container, &spec.name, event_kind, RegistrationPhase::Started, false);

		let id = match self.reconcile(&spec)? {
			Reconciled::Unchanged(existing) => existing,
			Reconciled::New | Reconciled::Changed(_) => {
				let container = self.container_for(&spec.container);
				let super_type = self.resolve_super(&spec)?;
				let id = self.objects.allocate(spec.kind.object_kind(), TYPE_FLAGS);
				let name = self.names.intern(&spec.name);
				self.name_object(id, name, container, true)?;
				self.insert_type(id, &spec, super_type);
				match spec.kind {
					TypeKind::Enum => self.counts.enums += 1,
					_ => self.counts.structs += 1,
				}
				trace!(kind = %spec.kind, object = %self.path_name(id), "constructed");
				id
			}
		};

		self.emit(&spec.container, &spec.name, event_kind, RegistrationPhase::Finished, false);
		Ok(id)
	}

	/// Allocates the class object, or keeps the existing one on an unchanged
	/// hot reload.
	pub(super) fn prepare_class(&mut self, spec: &TypeSpec) -> Result<ClassSlot, BootstrapError> {
		let reconciled = self.reconcile(spec)?;
		if let Reconciled::Unchanged(old) = reconciled {
			self.hot_reload.push_reinstance(Reinstance {
				old,
				new: None,
				changed: false,
			});
			debug!(class = %self.path_name(old), "class unchanged by hot reload");
			return Ok(ClassSlot::Existing(old));
		}

		let id = self.objects.allocate(ObjectKind::Class, CLASS_FLAGS);
		match reconciled {
			Reconciled::Changed(old) => self.hot_reload.push_reinstance(Reinstance {
				old,
				new: Some(id),
				changed: true,
			}),
			_ if self.hot_reload.is_reloading() => self.hot_reload.push_added(id),
			_ => {}
		}
		Ok(ClassSlot::Fresh(id))
	}

	/// Class descriptor body: names the class, links its super class and
	/// schedules its default instance.
	pub(super) fn construct_class(&mut self, id: ObjectId, spec: TypeSpec) -> Result<ObjectId, BootstrapError> {
		self.emit(
			&spec.container,
			&spec.name,
			RegistrationKind::Class,
			RegistrationPhase::Started,
			false,
		);
		self.force_materialize_inner(id, true)?;
		self.check_produced(id, TypeKind::Class, &spec.name)?;
		let super_type = self.resolve_super(&spec)?;
		self.insert_type(id, &spec, super_type);
		self.counts.classes += 1;
		self.pending_defaults.push(id);
		trace!(class = %self.path_name(id), "class constructed");
		self.emit(
			&spec.container,
			&spec.name,
			RegistrationKind::Class,
			RegistrationPhase::Finished,
			false,
		);
		Ok(id)
	}

	/// Resolves the super type by name, naming a still-pending super class on
	/// demand.
	fn resolve_super(&mut self, spec: &TypeSpec) -> Result<Option<ObjectId>, BootstrapError> {
		let Some(super_name) = spec.super_type.as_deref() else {
			return Ok(None);
		};
		let name = self.names.intern(super_name);
		let kind = spec.kind.object_kind();
		if let Some(found) = self.objects.find_any(name, Some(kind)) {
			return Ok(Some(found));
		}
		let pending = self
			.ledger
			.find_by_name(name)
			.filter(|&id| self.objects.get(id).is_some_and(|r| r.kind() == kind));
		if let Some(pending) = pending {
			self.force_materialize_inner(pending, true)?;
			return Ok(Some(pending));
		}
		Err(BootstrapError::MissingSuper {
			name: format!("{}.{}", spec.container, spec.name),
			super_name: super_name.to_owned(),
		})
	}

	fn insert_type(&mut self, id: ObjectId, spec: &TypeSpec, super_type: Option<ObjectId>) {
		let references = spec.references.iter().map(|r| self.names.intern(r)).collect();
		let variants = spec.variants.iter().map(|v| self.names.intern(v)).collect();
		self.types.insert(
			id,
			RuntimeType {
				kind: spec.kind,
				super_type,
				fingerprint: spec.fingerprint,
				references,
				variants,
				defaults: spec.defaults.clone(),
				default_instance: None,
			},
		);
	}

	/// Checks that a factory produced a named object of the declared kind.
	pub(super) fn check_produced(&self, id: ObjectId, kind: TypeKind, label: &str) -> Result<ObjectId, BootstrapError> {
		let record = self.objects.record(id)?;
		if !record.is_named() {
			return Err(BootstrapError::Unnamed {
				id,
				kind: record.kind(),
			});
		}
		if record.kind() != kind.object_kind() {
			return Err(BootstrapError::KindMismatch {
				name: label.to_owned(),
				declared: kind,
				produced: record.kind(),
			});
		}
		Ok(id)
	}

	/// Replays every [`compiled_in!`](crate::compiled_in!) entry once. Later
	/// calls return `Ok(0)`.
	pub fn collect_compiled_in(&mut self) -> Result<usize, BootstrapError> {
		self.ensure_healthy()?;
		if self.compiled_in_collected {
			return Ok(0);
		}
		self.compiled_in_collected = true;
		let entries = compiled_in();
		for entry in &entries {
			trace!(kind = %entry.kind, container = entry.container, name = entry.name, "compiled-in");
			let result = (entry.register)(self);
			self.guard(result)?;
		}
		debug!(count = entries.len(), "collected compiled-in types");
		Ok(entries.len())
	}

	/// Moves a module's held registrants into the global queue. Returns how
	/// many moved; unknown or already released modules move nothing.
	pub fn release_module(&mut self, module: &str) -> usize {
		let container = self.names.intern(&module_container_name(module));
		self.release_container(container)
	}

	/// Module-loader callback.
	pub fn on_module_loaded(&mut self, module: &str) -> usize {
		let released = self.release_module(module);
		debug!(module, released, "module loaded");
		released
	}

	pub(super) fn release_container(&mut self, container: Name) -> usize {
		let ids = self.modules.release(container);
		let count = ids.len();
		if count > 0 {
			self.ledger.push_order(ids);
			self.released.push(container);
			debug!(container = self.names.resolve(container), count, "released module registrants");
		}
		count
	}

	/// Releases every held bucket into the global queue.
	pub(super) fn release_all_containers(&mut self) -> usize {
		let mut total = 0;
		for (container, ids) in self.modules.release_all() {
			total += ids.len();
			self.ledger.push_order(ids);
			self.released.push(container);
		}
		total
	}

	/// Modules whose registrants are still held.
	pub fn pending_modules(&self) -> Vec<PendingModule> {
		self.modules
			.iter()
			.map(|(container, registrants)| PendingModule {
				container: self.names.resolve(container).to_owned(),
				registrants,
			})
			.collect()
	}

	/// Logs every held module bucket.
	pub fn dump_pending_modules(&self) {
		let pending = self.pending_modules();
		info!(count = pending.len(), "modules with held registrants");
		for module in &pending {
			info!(
				container = %module.container,
				registrants = module.registrants,
				"held module"
			);
		}
	}

	/// Number of registrants recorded but not yet named, held ones included.
	pub fn pending_registrants(&self) -> usize {
		self.ledger.len()
	}
}
