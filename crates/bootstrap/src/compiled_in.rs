//! Link-time registration of compiled-in types.
//!
//! Each compiled-in type submits a [`CompiledIn`] entry through
//! [`compiled_in!`](crate::compiled_in!). Entries are gathered at runtime with
//! `inventory`, sorted, and replayed by [`Bootstrap::collect_compiled_in`] in
//! a deterministic order regardless of link order.
//!
//! [`Bootstrap::collect_compiled_in`]: crate::Bootstrap::collect_compiled_in

use crate::descriptor::TypeKind;
use crate::engine::Bootstrap;
use crate::error::BootstrapError;

/// Declares one compiled-in type.
pub struct CompiledIn {
	pub kind: TypeKind,
	pub container: &'static str,
	pub name: &'static str,
	/// Lower runs first.
	pub priority: i16,
	/// Performs the declaration, typically `Bootstrap::declare`.
	pub register: fn(&mut Bootstrap) -> Result<(), BootstrapError>,
}

impl CompiledIn {
	pub const fn new(
		kind: TypeKind,
		container: &'static str,
		name: &'static str,
		priority: i16,
		register: fn(&mut Bootstrap) -> Result<(), BootstrapError>,
	) -> Self {
		Self {
			kind,
			container,
			name,
			priority,
			register,
		}
	}
}

impl std::fmt::Debug for CompiledIn {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompiledIn")
			.field("kind", &self.kind)
			.field("container", &self.container)
			.field("name", &self.name)
			.field("priority", &self.priority)
			.finish_non_exhaustive()
	}
}

inventory::collect!(CompiledIn);

/// Every submitted entry, sorted by (priority, kind, container, name).
pub fn compiled_in() -> Vec<&'static CompiledIn> {
	let mut entries: Vec<_> = inventory::iter::<CompiledIn>.into_iter().collect();
	entries.sort_by(|a, b| {
		(a.priority, a.kind, a.container, a.name).cmp(&(b.priority, b.kind, b.container, b.name))
	});
	entries
}

/// Submits a compiled-in type.
///
/// ```ignore
/// fn register_actor(boot: &mut Bootstrap) -> Result<(), BootstrapError> {
///     boot.declare(TypeSpec::class("/Script/Engine", "Actor").with_super("Object"))
/// }
/// kiln_bootstrap::compiled_in!(Class, "/Script/Engine", "Actor", register_actor);
/// ```
#[macro_export]
macro_rules! compiled_in {
	($kind:ident, $container:literal, $name:literal, $register:expr) => {
		$crate::compiled_in!($kind, $container, $name, 0, $register);
	};
	($kind:ident, $container:literal, $name:literal, $priority:expr, $register:expr) => {
		$crate::inventory::submit! {
			$crate::CompiledIn::new(
				$crate::TypeKind::$kind,
				$container,
				$name,
				$priority,
				$register,
			)
		}
	};
}
