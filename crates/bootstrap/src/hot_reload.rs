//! Hot reload bookkeeping.
//!
//! Fingerprints of every declared type are remembered while hot reload is
//! enabled. During a reload session a re-declared type compares its new
//! fingerprint against the old one: unchanged types keep their existing
//! object, changed ones retire it. Re-instancing notifications go out once,
//! when the session's outermost epoch ends.

use kiln_object::{Name, ObjectId};
use rustc_hash::FxHashMap as HashMap;

use crate::descriptor::Fingerprint;

/// Outcome of comparing a re-declared type against the remembered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FingerprintCheck {
	New,
	Unchanged,
	Changed,
}

/// Notification sent to re-instancing subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotReloadEvent {
	/// `old` must be re-instanced as `new`. `new` is `None` when the type did
	/// not change and the old object stays in use.
	ClassReinstanced {
		old: ObjectId,
		new: Option<ObjectId>,
		changed: bool,
	},
	/// Classes that did not exist before this session.
	AddedClasses(Vec<ObjectId>),
	/// All re-instancing notifications of the session were sent.
	ReinstancingComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reinstance {
	pub(crate) old: ObjectId,
	pub(crate) new: Option<ObjectId>,
	pub(crate) changed: bool,
}

/// Records whose old class was retired; unchanged classes stay in use.
pub(crate) fn retired_classes(records: &[Reinstance]) -> usize {
	records.iter().filter(|r| r.changed).count()
}

type Subscriber = Box<dyn FnMut(&HotReloadEvent) + Send>;

#[derive(Default)]
pub(crate) struct HotReload {
	enabled: bool,
	reloading: bool,
	fingerprints: HashMap<(Name, Name), Fingerprint>,
	reinstances: Vec<Reinstance>,
	added: Vec<ObjectId>,
	subscribers: Vec<Subscriber>,
}

impl HotReload {
	pub(crate) fn new(enabled: bool) -> Self {
		Self {
			enabled,
			..Self::default()
		}
	}

	pub(crate) fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub(crate) fn is_reloading(&self) -> bool {
		self.reloading
	}

	pub(crate) fn begin(&mut self) {
		self.reloading = true;
	}

	/// Compares against and then remembers `fingerprint`.
	pub(crate) fn check(&mut self, container: Name, name: Name, fingerprint: Fingerprint) -> FingerprintCheck {
		match self.fingerprints.insert((container, name), fingerprint) {
			None => FingerprintCheck::New,
			Some(old) if old == fingerprint => FingerprintCheck::Unchanged,
			Some(_) => FingerprintCheck::Changed,
		}
	}

	pub(crate) fn push_reinstance(&mut self, record: Reinstance) {
		self.reinstances.push(record);
	}

	pub(crate) fn push_added(&mut self, class: ObjectId) {
		self.added.push(class);
	}

	pub(crate) fn subscribe(&mut self, subscriber: impl FnMut(&HotReloadEvent) + Send + 'static) {
		self.subscribers.push(Box::new(subscriber));
	}

	pub(crate) fn has_subscribers(&self) -> bool {
		!self.subscribers.is_empty()
	}

	pub(crate) fn broadcast(&mut self, event: &HotReloadEvent) {
		for subscriber in &mut self.subscribers {
			subscriber(event);
		}
	}

	/// Ends the session, returning the pending re-instance records and added
	/// classes.
	pub(crate) fn finish(&mut self) -> (Vec<Reinstance>, Vec<ObjectId>) {
		self.reloading = false;
		(
			std::mem::take(&mut self.reinstances),
			std::mem::take(&mut self.added),
		)
	}
}

impl std::fmt::Debug for HotReload {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HotReload")
			.field("enabled", &self.enabled)
			.field("reloading", &self.reloading)
			.field("fingerprints", &self.fingerprints.len())
			.field("reinstances", &self.reinstances)
			.field("added", &self.added)
			.field("subscribers", &self.subscribers.len())
			.finish()
	}
}
