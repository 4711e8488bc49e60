use core::fmt;

macro_rules! define_id {
	($(#[$attr:meta])* $name:ident, $tag:literal) => {
		$(#[$attr])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub struct $name(u32);

		impl $name {
			/// Wraps a raw dense value.
			pub const fn from_u32(raw: u32) -> Self {
				Self(raw)
			}

			/// Returns the raw dense value.
			pub const fn as_u32(self) -> u32 {
				self.0
			}

			#[inline]
			pub(crate) const fn as_usize(self) -> usize {
				self.0 as usize
			}

			#[inline]
			pub(crate) fn from_usize(raw: usize) -> Self {
				debug_assert!(raw <= u32::MAX as usize);
				Self(raw as u32)
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, concat!($tag, "#{}"), self.0)
			}
		}
	};
}

define_id!(
	/// Identity of an object in an [`crate::ObjectArena`].
	///
	/// Identities exist as soon as memory for the object is reserved, which
	/// happens long before the object has a name, a container or a slot.
	ObjectId,
	"obj"
);

define_id!(
	/// Identity of a container in a [`crate::ContainerProvider`].
	ContainerId,
	"container"
);

define_id!(
	/// Slot in the garbage-collected object array.
	InternalIndex,
	"slot"
);
