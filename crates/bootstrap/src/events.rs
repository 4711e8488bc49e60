//! Registration progress notifications.
//!
//! Listeners observe each type being queued (`Added`) and built (`Started`,
//! `Finished`). Dynamic types report `Added` when their factory is registered.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
	Class,
	ClassDefault,
	Struct,
	Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationPhase {
	Added,
	Started,
	Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationEvent<'a> {
	pub container: &'a str,
	pub name: &'a str,
	pub kind: RegistrationKind,
	pub phase: RegistrationPhase,
	pub dynamic: bool,
}

type Listener = Box<dyn FnMut(&RegistrationEvent<'_>) + Send>;

#[derive(Default)]
pub(crate) struct RegistrationEvents {
	listeners: Vec<Listener>,
}

impl RegistrationEvents {
	pub(crate) fn subscribe(&mut self, listener: impl FnMut(&RegistrationEvent<'_>) + Send + 'static) {
		self.listeners.push(Box::new(listener));
	}

	pub(crate) fn emit(&mut self, event: RegistrationEvent<'_>) {
		for listener in &mut self.listeners {
			listener(&event);
		}
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.listeners.is_empty()
	}
}

impl std::fmt::Debug for RegistrationEvents {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegistrationEvents")
			.field("listeners", &self.listeners.len())
			.finish()
	}
}
