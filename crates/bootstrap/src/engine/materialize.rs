//! The fixed-point epoch loop.
//!
//! An outermost [`Bootstrap::materialize_all`] repeats passes until the
//! ledger's order list, every descriptor queue and the default-instance
//! backlog are empty. Each pass:
//!
//! 1. names pending registrants in arrival order, picking up arrivals made
//!    while the pass runs;
//! 2. runs enum descriptors, then struct descriptors;
//! 3. runs class descriptors;
//! 4. builds default instances for the classes just constructed.
//!
//! Step 4 runs user hooks, which may declare more types. Those land in the
//! queues and are picked up by the next pass.
//!
//! A reentrant call from inside a hook only drains steps 1 to 3 and leaves
//! default instances and finalization to the outer call.

use kiln_object::ObjectId;
use tracing::{debug, debug_span, trace};

use super::{Bootstrap, LoadPhase};
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::BootstrapError;
use crate::report::{EpochReport, KindCounts};

impl Bootstrap {
	/// Runs one bootstrap epoch to quiescence.
	///
	/// Outside the initial load, an epoch that constructed classes assembles
	/// GC reference metadata exactly once before returning. Every outermost
	/// epoch publishes a new catalog snapshot.
	pub fn materialize_all(&mut self) -> Result<EpochReport, BootstrapError> {
		self.ensure_healthy()?;
		if self.depth > 0 {
			let result = self.drain_registrations();
			self.guard(result)?;
			return Ok(EpochReport {
				epoch: self.epoch,
				nested: true,
				counts: self.counts,
				..EpochReport::default()
			});
		}

		if !self.index.is_ready() && self.has_pending_work() {
			let err = BootstrapError::NotInitialized {
				what: format!(
					"{} pending registrants and queued descriptors",
					self.ledger.len()
				),
			};
			return self.guard(Err(err));
		}

		self.depth += 1;
		self.epoch += 1;
		self.counts = KindCounts::default();
		let span = debug_span!("materialize_all", epoch = self.epoch).entered();
		let result = self.run_fixed_point();
		drop(span);
		self.depth -= 1;
		self.guard(result)
	}

	fn has_pending_work(&self) -> bool {
		!self.ledger.is_queue_empty() || !self.queues.is_empty() || !self.pending_defaults.is_empty()
	}

	fn run_fixed_point(&mut self) -> Result<EpochReport, BootstrapError> {
		let mut passes = 0;
		while self.has_pending_work() {
			passes += 1;
			trace!(pass = passes, "materialize pass");
			self.process_registrants()?;
			self.load_enums_and_structs()?;
			self.load_classes()?;
			self.construct_default_instances()?;
		}

		if self.hot_reload.is_reloading() {
			self.finish_hot_reload();
		}

		let gc_assembled = self.counts.classes > 0 && self.phase == LoadPhase::Steady;
		if gc_assembled {
			self.gc.assemble(&self.types);
		}
		self.publish_catalog();
		self.totals += self.counts;

		let released_modules = std::mem::take(&mut self.released)
			.into_iter()
			.map(|name| self.names.resolve(name).to_owned())
			.collect();
		let report = EpochReport {
			epoch: self.epoch,
			nested: false,
			passes,
			counts: self.counts,
			released_modules,
			gc_assembled,
			issues: std::mem::take(&mut self.epoch_issues),
		};
		debug!(
			epoch = report.epoch,
			passes,
			registrants = report.counts.registrants,
			types = report.counts.types(),
			enums = report.counts.enums,
			structs = report.counts.structs,
			classes = report.counts.classes,
			default_instances = report.counts.default_instances,
			gc_assembled,
			"epoch complete"
		);
		Ok(report)
	}

	/// Steps 1 to 3 until no registrant or descriptor is left.
	fn drain_registrations(&mut self) -> Result<(), BootstrapError> {
		while !self.ledger.is_queue_empty() || !self.queues.is_empty() {
			self.process_registrants()?;
			self.load_enums_and_structs()?;
			self.load_classes()?;
		}
		Ok(())
	}

	/// Names every queued registrant, including ones that arrive meanwhile.
	pub(super) fn process_registrants(&mut self) -> Result<(), BootstrapError> {
		if self.ledger.is_queue_empty() {
			return Ok(());
		}
		if !self.index.is_ready() {
			return Err(BootstrapError::NotInitialized {
				what: format!("{} pending registrants", self.ledger.len()),
			});
		}

		let mut worklist = self.ledger.dequeue_all();
		let mut next = 0;
		while let Some(&id) = worklist.get(next) {
			next += 1;
			self.force_materialize_inner(id, false)?;
			self.ensure_named(id)?;
			worklist.extend(self.ledger.dequeue_all());
		}
		trace!(processed = next, "processed pending registrants");
		Ok(())
	}

	fn ensure_named(&self, id: ObjectId) -> Result<(), BootstrapError> {
		let record = self.objects.record(id)?;
		if record.is_named() {
			Ok(())
		} else {
			Err(BootstrapError::Unnamed {
				id,
				kind: record.kind(),
			})
		}
	}

	/// Runs the queued enums, then the queued structs. Containers for both
	/// batches exist before the first descriptor runs.
	fn load_enums_and_structs(&mut self) -> Result<(), BootstrapError> {
		let enums = self.queues.take(TypeKind::Enum);
		let structs = self.queues.take(TypeKind::Struct);
		if enums.is_empty() && structs.is_empty() {
			return Ok(());
		}
		for descriptor in enums.iter().chain(&structs) {
			self.container_for(descriptor.container());
		}
		for descriptor in enums.into_iter().chain(structs) {
			self.invoke(descriptor)?;
		}
		Ok(())
	}

	fn load_classes(&mut self) -> Result<(), BootstrapError> {
		for descriptor in self.queues.take(TypeKind::Class) {
			self.invoke(descriptor)?;
		}
		Ok(())
	}

	fn invoke(&mut self, descriptor: TypeDescriptor) -> Result<ObjectId, BootstrapError> {
		let (kind, container, name, factory) = descriptor.into_parts();
		let id = factory(self)?;
		self.check_produced(id, kind, &format!("{container}.{name}"))?;
		trace!(%kind, object = %self.path_name(id), "descriptor materialized");
		Ok(id)
	}

	/// Releases `module`'s held registrants, if any, then runs an epoch when
	/// `can_materialize` is set. Returns `None` when no epoch ran.
	pub fn run_bootstrap_epoch(
		&mut self,
		module: Option<&str>,
		can_materialize: bool,
	) -> Result<Option<EpochReport>, BootstrapError> {
		self.ensure_healthy()?;
		if let Some(module) = module {
			self.release_module(module);
		}
		if !can_materialize {
			return Ok(None);
		}
		self.materialize_all().map(Some)
	}

	/// Releases every held module bucket, then runs an epoch.
	pub fn release_all_modules(&mut self) -> Result<EpochReport, BootstrapError> {
		self.ensure_healthy()?;
		let released = self.release_all_containers();
		debug!(released, "released all module registrants");
		self.materialize_all()
	}
}
