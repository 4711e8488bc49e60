use indexmap::IndexMap;
use kiln_object::{Name, ObjectId};

use crate::descriptor::{DefaultsHook, Fingerprint, TypeKind};

/// Runtime data attached to a materialized type object.
#[derive(Clone)]
pub struct RuntimeType {
	pub(crate) kind: TypeKind,
	pub(crate) super_type: Option<ObjectId>,
	pub(crate) fingerprint: Fingerprint,
	pub(crate) references: Vec<Name>,
	pub(crate) variants: Vec<Name>,
	pub(crate) defaults: Option<DefaultsHook>,
	pub(crate) default_instance: Option<ObjectId>,
}

impl RuntimeType {
	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	pub fn super_type(&self) -> Option<ObjectId> {
		self.super_type
	}

	pub fn fingerprint(&self) -> Fingerprint {
		self.fingerprint
	}

	/// Reference fields declared directly on this type.
	pub fn references(&self) -> &[Name] {
		&self.references
	}

	pub fn variants(&self) -> &[Name] {
		&self.variants
	}

	pub fn default_instance(&self) -> Option<ObjectId> {
		self.default_instance
	}
}

impl std::fmt::Debug for RuntimeType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RuntimeType")
			.field("kind", &self.kind)
			.field("super_type", &self.super_type)
			.field("fingerprint", &self.fingerprint)
			.field("references", &self.references)
			.field("variants", &self.variants)
			.field("default_instance", &self.default_instance)
			.finish_non_exhaustive()
	}
}

/// Materialized types in materialization order.
pub(crate) type TypeTable = IndexMap<ObjectId, RuntimeType>;
