//! Hot reload reconciliation and retirement.

use kiln_object::{ContainerId, InternalFlags, ObjectFlags, ObjectId};
use tracing::{debug, info, warn};

use super::Bootstrap;
use crate::descriptor::TypeSpec;
use crate::error::BootstrapError;
use crate::hot_reload::{FingerprintCheck, HotReloadEvent, retired_classes};

/// How a declaration relates to what already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Reconciled {
	New,
	/// Same fingerprint; keep using the existing object.
	Unchanged(ObjectId),
	/// Different fingerprint; the existing object was retired.
	Changed(ObjectId),
}

impl Bootstrap {
	/// Starts a hot reload session. Declarations until the end of the next
	/// outermost epoch are compared against the types they replace. Returns
	/// `false` when hot reload is disabled.
	pub fn begin_hot_reload(&mut self) -> bool {
		if !self.hot_reload.is_enabled() {
			warn!("hot reload requested but disabled in configuration");
			return false;
		}
		info!(epoch = self.epoch, "hot reload started");
		self.hot_reload.begin();
		true
	}

	pub fn is_hot_reloading(&self) -> bool {
		self.hot_reload.is_reloading()
	}

	pub(super) fn reconcile(&mut self, spec: &TypeSpec) -> Result<Reconciled, BootstrapError> {
		if !self.hot_reload.is_enabled() {
			return Ok(Reconciled::New);
		}
		let container = self.names.intern(&spec.container);
		let name = self.names.intern(&spec.name);
		let check = self.hot_reload.check(container, name, spec.fingerprint);
		if check == FingerprintCheck::New {
			return Ok(Reconciled::New);
		}
		if !self.hot_reload.is_reloading() {
			return Err(BootstrapError::RecreatedOutsideHotReload {
				name: format!("{}.{}", spec.container, spec.name),
			});
		}

		let kind = spec.kind.object_kind();
		let existing = self
			.containers
			.find(container)
			.and_then(|c| self.objects.find(c, name))
			.filter(|&id| self.objects.get(id).is_some_and(|r| r.kind() == kind));
		let Some(old) = existing else {
			info!(kind = %spec.kind, container = %spec.container, name = %spec.name, "nothing to reload, creating new type");
			return Ok(Reconciled::New);
		};

		if check == FingerprintCheck::Unchanged {
			return Ok(Reconciled::Unchanged(old));
		}
		self.retire(old)?;
		Ok(Reconciled::Changed(old))
	}

	/// Moves a replaced type and its default instance into the transient
	/// container, still rooted so live instances keep working.
	fn retire(&mut self, old: ObjectId) -> Result<(), BootstrapError> {
		let path = self.path_name(old);
		let transient = self.transient_container();
		self.retire_object(old, transient)?;
		if let Some(instance) = self.default_instance(old) {
			self.retire_object(instance, transient)?;
		}
		info!(old = %path, retired = %self.path_name(old), "retired reloaded type");
		Ok(())
	}

	fn retire_object(&mut self, id: ObjectId, transient: ContainerId) -> Result<(), BootstrapError> {
		let record = self.objects.record(id)?;
		let base = format!("HOTRELOADED_{}", self.names.resolve(record.name()));
		let index = record.index();

		self.objects.clear_flags(id, ObjectFlags::STANDALONE | ObjectFlags::PUBLIC)?;
		if let Some(index) = index {
			self.index.clear_flags(index, InternalFlags::ROOT_SET)?;
		}
		let unique = self.objects.make_unique_name(&mut self.names, transient, &base);
		self.objects.rename(id, unique, Some(transient))?;
		self.objects.set_flags(id, ObjectFlags::TRANSIENT)?;
		if let Some(index) = index {
			self.index.set_flags(index, InternalFlags::ROOT_SET)?;
		}
		Ok(())
	}

	/// Ends the hot reload session and notifies subscribers.
	pub(super) fn finish_hot_reload(&mut self) {
		let (records, added) = self.hot_reload.finish();
		let retired = retired_classes(&records);
		if !added.is_empty() {
			self.hot_reload.broadcast(&HotReloadEvent::AddedClasses(added));
		}
		if self.hot_reload.has_subscribers() {
			for record in &records {
				self.hot_reload.broadcast(&HotReloadEvent::ClassReinstanced {
					old: record.old,
					new: record.new,
					changed: record.changed,
				});
			}
		} else if retired > 0 {
			warn!(
				classes = retired,
				"no re-instancing subscriber; retired classes stay alive in the transient container"
			);
		}
		self.hot_reload.broadcast(&HotReloadEvent::ReinstancingComplete);
		debug!(reinstanced = records.len(), "hot reload finished");
	}
}
