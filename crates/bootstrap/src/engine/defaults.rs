//! Default-instance construction.
//!
//! Every materialized class gets one default instance, `Default__<Name>`,
//! living in the class's container. Super classes get theirs first. Hooks run
//! on the new instance before it is published, and may request other default
//! instances; asking for one that is still being built is a circular
//! dependency.

use kiln_object::{ObjectFlags, ObjectId, ObjectKind};
use tracing::{trace, warn};

use super::Bootstrap;
use crate::descriptor::{DefaultInstance, TypeKind};
use crate::error::BootstrapError;
use crate::events::{RegistrationKind, RegistrationPhase};
use crate::report::{IssueSeverity, PropertyIssue};

impl Bootstrap {
	/// Builds default instances for every class queued since the last call,
	/// bucket by bucket in container priority order.
	pub(super) fn construct_default_instances(&mut self) -> Result<(), BootstrapError> {
		let classes = std::mem::take(&mut self.pending_defaults);
		if classes.is_empty() {
			return Ok(());
		}

		let bucket_count = self.config.container_priority.len() + 1;
		let mut buckets = vec![Vec::new(); bucket_count];
		for class in classes {
			let bucket = self
				.objects
				.get(class)
				.and_then(|r| r.container())
				.and_then(|c| self.containers.name_of(c))
				.map_or(bucket_count - 1, |name| self.config.bucket_of(self.names.resolve(name)));
			buckets[bucket].push(class);
		}

		for (bucket, classes) in buckets.into_iter().enumerate() {
			if classes.is_empty() {
				continue;
			}
			trace!(bucket, classes = classes.len(), "default instance bucket");
			for class in classes {
				self.ensure_default_instance(class)?;
			}
		}

		self.flush_default_issues();
		Ok(())
	}

	/// Returns the default instance of `class`, building it (and those of its
	/// super classes) if needed.
	pub fn ensure_default_instance(&mut self, class: ObjectId) -> Result<ObjectId, BootstrapError> {
		self.ensure_healthy()?;
		let result = self.ensure_default_instance_inner(class);
		self.guard(result)
	}

	fn ensure_default_instance_inner(&mut self, class: ObjectId) -> Result<ObjectId, BootstrapError> {
		let mut chain = Vec::new();
		let mut cursor = Some(class);
		while let Some(current) = cursor {
			let ty = self
				.types
				.get(&current)
				.ok_or_else(|| BootstrapError::UnknownType(self.path_name(current)))?;
			if ty.kind != TypeKind::Class {
				return Err(BootstrapError::KindMismatch {
					name: self.path_name(current),
					declared: TypeKind::Class,
					produced: ty.kind.object_kind(),
				});
			}
			if ty.default_instance.is_some() {
				break;
			}
			if self.constructing.contains(&current) || chain.contains(&current) {
				return Err(self.circular(current));
			}
			chain.push(current);
			cursor = ty.super_type;
		}

		for current in chain.into_iter().rev() {
			self.construct_default_instance(current)?;
		}
		self.default_instance(class)
			.ok_or_else(|| BootstrapError::UnknownType(self.path_name(class)))
	}

	fn construct_default_instance(&mut self, class: ObjectId) -> Result<(), BootstrapError> {
		if self.default_instance(class).is_some() {
			return Ok(());
		}
		self.constructing.insert(class);
		let result = self.build_default_instance(class);
		self.constructing.shift_remove(&class);
		result
	}

	fn build_default_instance(&mut self, class: ObjectId) -> Result<(), BootstrapError> {
		let record = self.objects.record(class)?;
		let container = record.container().ok_or(BootstrapError::Unnamed {
			id: class,
			kind: record.kind(),
		})?;
		let class_name = self.names.resolve(record.name()).to_owned();
		let container_name = self
			.containers
			.name_of(container)
			.map(|n| self.names.resolve(n).to_owned())
			.unwrap_or_default();
		let default_name = format!("Default__{class_name}");

		self.emit(
			&container_name,
			&default_name,
			RegistrationKind::ClassDefault,
			RegistrationPhase::Started,
			false,
		);

		let instance = self.objects.allocate(
			ObjectKind::Instance,
			ObjectFlags::PUBLIC | ObjectFlags::CLASS_DEFAULT_OBJECT,
		);
		self.objects.set_class(instance, class)?;
		let name = self.names.intern(&default_name);
		self.name_object(instance, name, container, true)?;

		let hook = self.types.get(&class).and_then(|t| t.defaults.clone());
		if let Some(hook) = hook {
			hook(self, DefaultInstance { class, instance })?;
		}
		if let Some(ty) = self.types.get_mut(&class) {
			ty.default_instance = Some(instance);
		}
		self.counts.default_instances += 1;
		trace!(instance = %self.path_name(instance), "default instance constructed");

		self.emit(
			&container_name,
			&default_name,
			RegistrationKind::ClassDefault,
			RegistrationPhase::Finished,
			false,
		);
		Ok(())
	}

	fn circular(&self, repeated: ObjectId) -> BootstrapError {
		let chain = self
			.constructing
			.iter()
			.chain(std::iter::once(&repeated))
			.map(|&id| self.path_name(id))
			.collect::<Vec<_>>()
			.join(" -> ");
		BootstrapError::CircularDependency { chain }
	}

	/// Records a soft problem found while initializing a default instance.
	/// Issues are logged together once the current batch of default
	/// instances is done.
	pub fn report_default_issue(&mut self, class: ObjectId, severity: IssueSeverity, message: impl Into<String>) {
		self.feedback.push(PropertyIssue {
			class: self.path_name(class),
			severity,
			message: message.into(),
		});
	}

	fn flush_default_issues(&mut self) {
		if self.feedback.is_empty() {
			return;
		}
		warn!(count = self.feedback.len(), "default property warnings and errors");
		for issue in &self.feedback {
			match issue.severity {
				IssueSeverity::Warning => warn!(class = %issue.class, "{}", issue.message),
				IssueSeverity::Error => warn!(class = %issue.class, error = true, "{}", issue.message),
			}
		}
		self.epoch_issues.append(&mut self.feedback);
	}
}
