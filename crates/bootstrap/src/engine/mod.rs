//! The bootstrap engine.
//!
//! [`Bootstrap`] owns every piece of registration state: the pending ledger,
//! descriptor queues, module buckets, type table, GC metadata and hot reload
//! session. Storage and containers are reached through the
//! [`ObjectIndex`] and [`ContainerProvider`] collaborators.
//!
//! Work is split across submodules:
//! - `register`: declarations, pending registrants, on-demand naming.
//! - `materialize`: the fixed-point epoch loop and its entry points.
//! - `defaults`: default-instance construction.
//! - `reload`: hot reload reconciliation and retirement.

mod defaults;
mod materialize;
mod register;
mod reload;


use std::thread::{self, ThreadId};

use indexmap::IndexSet;
use kiln_object::{
	ContainerFlags, ContainerId, ContainerProvider, ContainerTable, GcObjectArray, InternalFlags, Name, NameTable,
	ObjectArena, ObjectFlags, ObjectId, ObjectIndex, debug_full_name, debug_path_name,
};
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogEntry, CatalogHandle, TypeCatalog};
use crate::config::BootstrapConfig;
use crate::descriptor::TypeKind;
use crate::dynamic::{DynamicFactory, DynamicTypes, split_path};
use crate::error::BootstrapError;
use crate::events::{RegistrationEvent, RegistrationEvents, RegistrationKind, RegistrationPhase};
use crate::gc::{GcMetadata, ReferenceSchema};
use crate::hot_reload::{HotReload, HotReloadEvent};
use crate::ledger::PendingLedger;
use crate::modules::ModuleHoldingArea;
use crate::queue::DescriptorQueues;
use crate::report::{KindCounts, PropertyIssue};
use crate::types::{RuntimeType, TypeTable};

/// Whether the process is still in its initial load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
	#[default]
	Initial,
	Steady,
}

/// Registration and materialization state for one object system.
pub struct Bootstrap {
	config: BootstrapConfig,
	names: NameTable,
	objects: ObjectArena,
	index: Box<dyn ObjectIndex + Send>,
	containers: Box<dyn ContainerProvider + Send>,
	ledger: PendingLedger,
	queues: DescriptorQueues,
	modules: ModuleHoldingArea,
	types: TypeTable,
	pending_defaults: Vec<ObjectId>,
	constructing: IndexSet<ObjectId>,
	feedback: Vec<PropertyIssue>,
	hot_reload: HotReload,
	gc: GcMetadata,
	events: RegistrationEvents,
	dynamic: DynamicTypes,
	catalog: CatalogHandle,
	phase: LoadPhase,
	depth: u32,
	epoch: u64,
	counts: KindCounts,
	totals: KindCounts,
	epoch_issues: Vec<PropertyIssue>,
	released: Vec<Name>,
	/// Named objects that lost their slot to a shutdown, with their slot flags.
	detached: Vec<(ObjectId, InternalFlags)>,
	permanent_pool_size: usize,
	compiled_in_collected: bool,
	owner: ThreadId,
	poisoned: bool,
}

impl Bootstrap {
	/// Creates an engine backed by the in-memory [`GcObjectArray`] and
	/// [`ContainerTable`].
	pub fn new(config: BootstrapConfig) -> Self {
		Self::with_collaborators(config, GcObjectArray::new(), ContainerTable::new())
	}

	/// Creates an engine backed by host-provided storage and containers.
	pub fn with_collaborators(
		config: BootstrapConfig,
		index: impl ObjectIndex + Send + 'static,
		containers: impl ContainerProvider + Send + 'static,
	) -> Self {
		let hot_reload = HotReload::new(config.hot_reload);
		Self {
			config,
			names: NameTable::new(),
			objects: ObjectArena::new(),
			index: Box::new(index),
			containers: Box::new(containers),
			ledger: PendingLedger::new(),
			queues: DescriptorQueues::new(),
			modules: ModuleHoldingArea::new(),
			types: TypeTable::default(),
			pending_defaults: Vec::new(),
			constructing: IndexSet::new(),
			feedback: Vec::new(),
			hot_reload,
			gc: GcMetadata::new(),
			events: RegistrationEvents::default(),
			dynamic: DynamicTypes::default(),
			catalog: CatalogHandle::default(),
			phase: LoadPhase::Initial,
			depth: 0,
			epoch: 0,
			counts: KindCounts::default(),
			totals: KindCounts::default(),
			epoch_issues: Vec::new(),
			released: Vec::new(),
			detached: Vec::new(),
			permanent_pool_size: 0,
			compiled_in_collected: false,
			owner: thread::current().id(),
			poisoned: false,
		}
	}

	/// Sizes object storage and names every registrant recorded so far.
	/// Objects named before a [`Self::shutdown`] get fresh slots first.
	///
	/// A permanent object pool requires a disregard-for-GC region; without one
	/// the pool is disabled with a warning.
	pub fn init_object_system(&mut self) -> Result<(), BootstrapError> {
		self.ensure_healthy()?;
		let mut permanent = self.config.permanent_object_pool_size;
		if permanent > 0 && self.config.max_objects_not_considered_by_gc == 0 {
			warn!(
				permanent_object_pool_size = permanent,
				"permanent object pool disabled: it requires a disregard-for-GC budget"
			);
			permanent = 0;
		}
		self.permanent_pool_size = permanent;

		let pool = self.config.pool_config();
		info!(
			max_objects = pool.max_objects,
			disregard_budget = pool.max_objects_not_considered_by_gc,
			permanent_pool = permanent,
			"initializing object system"
		);
		self.index.allocate_object_pool(pool);

		let result = self.reattach_slots().and_then(|()| self.process_registrants());
		self.guard(result)
	}

	/// Releases object storage. Registration state is kept and named objects
	/// drop their slots, so a later [`Self::init_object_system`] starts from
	/// the same types.
	pub fn shutdown(&mut self) {
		for (id, index) in self.objects.detach_slots() {
			let flags = self.index.flags(index).unwrap_or_default();
			self.detached.push((id, flags));
		}
		info!(
			types = self.types.len(),
			detached = self.detached.len(),
			"shutting down object system"
		);
		self.index.shutdown();
	}

	fn reattach_slots(&mut self) -> Result<(), BootstrapError> {
		let detached = std::mem::take(&mut self.detached);
		for &(id, flags) in &detached {
			let index = self.index.allocate_index(id)?;
			self.objects.attach_slot(id, index)?;
			let mut flags = flags;
			// the new disregard region may cover objects that were outside the old one
			if self.index.is_disregard_for_gc(index) {
				flags |= InternalFlags::ROOT_SET;
			}
			if !flags.is_empty() {
				self.index.set_flags(index, flags)?;
			}
		}
		if !detached.is_empty() {
			debug!(count = detached.len(), "reattached objects to fresh slots");
		}
		Ok(())
	}

	/// Leaves the initial load: closes the disregard-for-GC region and runs the
	/// GC metadata assembly deferred during the initial load.
	pub fn end_initial_load(&mut self) -> Result<(), BootstrapError> {
		self.ensure_healthy()?;
		self.index.close_disregard_for_gc();
		if self.phase == LoadPhase::Initial {
			self.phase = LoadPhase::Steady;
			let assembled = self.gc.assemble(&self.types);
			info!(assembled, "initial load finished");
		}
		Ok(())
	}

	pub fn phase(&self) -> LoadPhase {
		self.phase
	}

	pub fn is_initial_load(&self) -> bool {
		self.phase == LoadPhase::Initial
	}

	/// Whether an earlier fatal error disabled this engine.
	pub fn is_poisoned(&self) -> bool {
		self.poisoned
	}

	pub fn config(&self) -> &BootstrapConfig {
		&self.config
	}

	/// Permanent pool size after [`Self::init_object_system`] validated it.
	pub fn permanent_pool_size(&self) -> usize {
		self.permanent_pool_size
	}

	pub fn names(&self) -> &NameTable {
		&self.names
	}

	pub fn names_mut(&mut self) -> &mut NameTable {
		&mut self.names
	}

	pub fn objects(&self) -> &ObjectArena {
		&self.objects
	}

	pub fn index(&self) -> &dyn ObjectIndex {
		self.index.as_ref()
	}

	pub fn containers(&self) -> &dyn ContainerProvider {
		self.containers.as_ref()
	}

	pub fn gc(&self) -> &GcMetadata {
		&self.gc
	}

	/// Work done by every outermost epoch so far.
	pub fn totals(&self) -> KindCounts {
		self.totals
	}

	/// Epochs completed so far.
	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	/// Cloneable reader of the catalog published after each epoch.
	pub fn catalog(&self) -> CatalogHandle {
		self.catalog.clone()
	}

	/// Runtime data of a materialized type.
	pub fn runtime_type(&self, id: ObjectId) -> Option<&RuntimeType> {
		self.types.get(&id)
	}

	/// Looks a live type up by container and name.
	pub fn find_type(&self, container: &str, name: &str) -> Option<ObjectId> {
		let container = self.containers.find(self.names.get(container)?)?;
		let id = self.objects.find(container, self.names.get(name)?)?;
		self.types.contains_key(&id).then_some(id)
	}

	/// Looks a live type up by name in any container.
	pub fn find_type_any(&self, name: &str) -> Option<ObjectId> {
		let name = self.names.get(name)?;
		self.types
			.keys()
			.copied()
			.find(|id| {
				self.objects
					.get(*id)
					.is_some_and(|r| r.name() == name && !r.flags().contains(ObjectFlags::TRANSIENT))
			})
	}

	/// Default instance of a class, if built.
	pub fn default_instance(&self, class: ObjectId) -> Option<ObjectId> {
		self.types.get(&class).and_then(RuntimeType::default_instance)
	}

	/// `container.name` of an object, for logs and errors.
	pub fn path_name(&self, id: ObjectId) -> String {
		debug_path_name(&self.objects, &self.names, self.containers.as_ref(), Some(id))
	}

	/// Class name followed by the path name.
	pub fn full_name(&self, id: ObjectId) -> String {
		debug_full_name(&self.objects, &self.names, self.containers.as_ref(), Some(id))
	}

	/// Subscribes to registration progress events.
	pub fn on_registration(&mut self, listener: impl FnMut(&RegistrationEvent<'_>) + Send + 'static) {
		self.events.subscribe(listener);
	}

	/// Subscribes to hot reload re-instancing notifications.
	pub fn on_hot_reload(&mut self, subscriber: impl FnMut(&HotReloadEvent) + Send + 'static) {
		self.hot_reload.subscribe(subscriber);
	}

	/// Registers a factory for a dynamic type addressed by `container.name`.
	pub fn register_dynamic_type(
		&mut self,
		path: &str,
		kind: TypeKind,
		factory: impl Fn(&mut Bootstrap) -> Result<ObjectId, BootstrapError> + Send + Sync + 'static,
	) {
		let factory: DynamicFactory = std::sync::Arc::new(factory);
		if !self.dynamic.insert(path, kind, factory) {
			warn!(path, "dynamic type factory replaced");
		}
		let (container, name) = split_path(path);
		self.emit(container, name, registration_kind(kind), RegistrationPhase::Added, true);
	}

	/// Kind registered for a dynamic type path.
	pub fn dynamic_type_kind(&self, path: &str) -> Option<TypeKind> {
		self.dynamic.get(path).map(|e| e.kind)
	}

	/// Constructs a dynamic type. Classes get their GC reference metadata
	/// immediately. Returns `None` for unknown paths.
	pub fn construct_dynamic_type(&mut self, path: &str) -> Result<Option<ObjectId>, BootstrapError> {
		self.ensure_healthy()?;
		let Some(entry) = self.dynamic.get(path).cloned() else {
			return Ok(None);
		};
		let result = (entry.factory)(self).and_then(|id| self.check_produced(id, entry.kind, path));
		let id = self.guard(result)?;
		if entry.kind == TypeKind::Class {
			self.gc.assemble_class(&self.types, id);
		}
		debug!(path, dynamic = self.dynamic.len(), "constructed dynamic type");
		Ok(Some(id))
	}

	/// Assembled GC schema of a class.
	pub fn reference_schema(&self, class: ObjectId) -> Option<&ReferenceSchema> {
		self.gc.schema(class)
	}

	/// Rebuilds and publishes the catalog snapshot.
	fn publish_catalog(&self) {
		let entries = self
			.types
			.iter()
			.filter_map(|(&id, ty)| {
				let record = self.objects.get(id)?;
				if !record.is_named() || record.flags().contains(ObjectFlags::TRANSIENT) {
					return None;
				}
				let container = self.containers.name_of(record.container()?)?;
				Some(CatalogEntry {
					id,
					kind: ty.kind,
					container: self.names.resolve(container).into(),
					name: self.names.resolve(record.name()).into(),
					super_type: ty.super_type,
					default_instance: ty.default_instance,
				})
			})
			.collect();
		self.catalog.publish(TypeCatalog::build(self.epoch, entries));
	}

	/// Returns the container for `name`, creating it on first use.
	fn container_for(&mut self, name: &str) -> ContainerId {
		let name = self.names.intern(name);
		self.containers.get_or_create(name)
	}

	fn transient_container(&mut self) -> ContainerId {
		let name = self.config.transient_container.clone();
		let id = self.container_for(&name);
		self.containers.set_flags(id, ContainerFlags::TRANSIENT);
		id
	}

	fn is_owner_thread(&self) -> bool {
		thread::current().id() == self.owner
	}

	fn emit(&mut self, container: &str, name: &str, kind: RegistrationKind, phase: RegistrationPhase, dynamic: bool) {
		if self.events.is_empty() {
			return;
		}
		self.events.emit(RegistrationEvent {
			container,
			name,
			kind,
			phase,
			dynamic,
		});
	}

	fn ensure_healthy(&self) -> Result<(), BootstrapError> {
		if self.poisoned {
			return Err(BootstrapError::Poisoned);
		}
		Ok(())
	}

	/// Logs and poisons on error.
	fn guard<T>(&mut self, result: Result<T, BootstrapError>) -> Result<T, BootstrapError> {
		if let Err(err) = &result
			&& !self.poisoned
		{
			error!(%err, epoch = self.epoch, "fatal bootstrap error");
			self.poisoned = true;
		}
		result
	}
}

pub(crate) const fn registration_kind(kind: TypeKind) -> RegistrationKind {
	match kind {
		TypeKind::Enum => RegistrationKind::Enum,
		TypeKind::Struct => RegistrationKind::Struct,
		TypeKind::Class => RegistrationKind::Class,
	}
}

impl std::fmt::Debug for Bootstrap {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Bootstrap")
			.field("phase", &self.phase)
			.field("epoch", &self.epoch)
			.field("depth", &self.depth)
			.field("pending", &self.ledger.len())
			.field("held_modules", &self.modules.len())
			.field("types", &self.types.len())
			.field("poisoned", &self.poisoned)
			.finish_non_exhaustive()
	}
}
