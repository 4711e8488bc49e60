use bitflags::bitflags;

bitflags! {
	/// Flags stored on an object record.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct ObjectFlags: u32 {
		/// Visible to lookups outside the owning container.
		const PUBLIC = 1 << 0;
		/// Kept alive even when unreferenced.
		const STANDALONE = 1 << 1;
		/// Never persisted; used for retired objects.
		const TRANSIENT = 1 << 2;
		/// Prototype instance of a class.
		const CLASS_DEFAULT_OBJECT = 1 << 3;
		/// Moved to [`InternalFlags::ROOT_SET`] when the object gets a slot.
		const MARK_AS_ROOT_SET = 1 << 4;
		/// Moved to [`InternalFlags::NATIVE`] when the object gets a slot.
		const MARK_AS_NATIVE = 1 << 5;
	}
}

bitflags! {
	/// Flags stored on a slot of the GC object array.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct InternalFlags: u32 {
		/// Member of the root set; never collected.
		const ROOT_SET = 1 << 0;
		/// Created by compiled-in code.
		const NATIVE = 1 << 1;
		/// Registered from a thread other than the bootstrap thread.
		const ASYNC = 1 << 2;
	}
}

bitflags! {
	/// Flags stored on a container.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct ContainerFlags: u32 {
		/// Holds compiled-in types.
		const COMPILED_IN = 1 << 0;
		/// Holds retired or throwaway objects.
		const TRANSIENT = 1 << 1;
	}
}

impl ObjectFlags {
	/// Removes the mark flags and returns the slot flags they stand for.
	pub fn take_slot_marks(&mut self) -> InternalFlags {
		let mut slot = InternalFlags::empty();
		if self.contains(ObjectFlags::MARK_AS_ROOT_SET) {
			slot |= InternalFlags::ROOT_SET;
		}
		if self.contains(ObjectFlags::MARK_AS_NATIVE) {
			slot |= InternalFlags::NATIVE;
		}
		self.remove(ObjectFlags::MARK_AS_ROOT_SET | ObjectFlags::MARK_AS_NATIVE);
		slot
	}
}
