use crate::descriptor::{TypeDescriptor, TypeKind};

/// FIFO descriptor queues, one per kind.
#[derive(Debug, Default)]
pub struct DescriptorQueues {
	enums: Vec<TypeDescriptor>,
	structs: Vec<TypeDescriptor>,
	classes: Vec<TypeDescriptor>,
}

impl DescriptorQueues {
	pub fn new() -> Self {
		Self::default()
	}

	fn queue_mut(&mut self, kind: TypeKind) -> &mut Vec<TypeDescriptor> {
		match kind {
			TypeKind::Enum => &mut self.enums,
			TypeKind::Struct => &mut self.structs,
			TypeKind::Class => &mut self.classes,
		}
	}

	pub fn push(&mut self, descriptor: TypeDescriptor) {
		self.queue_mut(descriptor.kind()).push(descriptor);
	}

	/// Detaches one kind's queue. Descriptors pushed afterwards wait for the
	/// next take.
	pub fn take(&mut self, kind: TypeKind) -> Vec<TypeDescriptor> {
		std::mem::take(self.queue_mut(kind))
	}

	pub fn len(&self, kind: TypeKind) -> usize {
		match kind {
			TypeKind::Enum => self.enums.len(),
			TypeKind::Struct => self.structs.len(),
			TypeKind::Class => self.classes.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.enums.is_empty() && self.structs.is_empty() && self.classes.is_empty()
	}
}
