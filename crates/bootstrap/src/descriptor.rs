//! Type descriptions and deferred construction thunks.
//!
//! A [`TypeSpec`] is the static shape of one compiled-in type. A
//! [`TypeDescriptor`] is a queued, run-once factory that turns a spec (or
//! anything else) into a named runtime type object.

use std::fmt;
use std::sync::Arc;

use kiln_object::{ObjectId, ObjectKind, strip_class_prefix};

use crate::engine::Bootstrap;
use crate::error::BootstrapError;

/// The three runtime type kinds, in materialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
	Enum,
	Struct,
	Class,
}

impl TypeKind {
	/// Object kind a descriptor of this kind must produce.
	pub const fn object_kind(self) -> ObjectKind {
		match self {
			TypeKind::Enum => ObjectKind::Enum,
			TypeKind::Struct => ObjectKind::Struct,
			TypeKind::Class => ObjectKind::Class,
		}
	}
}

impl fmt::Display for TypeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.object_kind(), f)
	}
}

/// Size and layout checksum used to detect changed types on hot reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint {
	pub size: usize,
	pub checksum: u32,
}

/// Default instance handed to a [`DefaultsHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultInstance {
	pub class: ObjectId,
	pub instance: ObjectId,
}

/// Initializes a freshly created default instance.
///
/// Hooks may request other default instances, declare new types, or run a
/// nested [`Bootstrap::materialize_all`].
pub type DefaultsHook = Arc<dyn Fn(&mut Bootstrap, DefaultInstance) -> Result<(), BootstrapError> + Send + Sync>;

type Factory = Box<dyn FnOnce(&mut Bootstrap) -> Result<ObjectId, BootstrapError> + Send>;

/// Static description of a compiled-in type.
#[derive(Clone)]
pub struct TypeSpec {
	pub(crate) kind: TypeKind,
	pub(crate) container: Box<str>,
	pub(crate) name: Box<str>,
	pub(crate) super_type: Option<Box<str>>,
	pub(crate) fingerprint: Fingerprint,
	pub(crate) references: Vec<Box<str>>,
	pub(crate) variants: Vec<Box<str>>,
	pub(crate) defaults: Option<DefaultsHook>,
}

impl TypeSpec {
	fn new(kind: TypeKind, container: &str, name: &str) -> Self {
		Self {
			kind,
			container: container.into(),
			name: name.into(),
			super_type: None,
			fingerprint: Fingerprint::default(),
			references: Vec::new(),
			variants: Vec::new(),
			defaults: None,
		}
	}

	pub fn class(container: &str, name: &str) -> Self {
		Self::new(TypeKind::Class, container, name)
	}

	/// Class declared under its native name: `"AActor"` registers `Actor`.
	pub fn native_class(container: &str, native_name: &str) -> Self {
		Self::class(container, strip_class_prefix(native_name))
	}

	pub fn structure(container: &str, name: &str) -> Self {
		Self::new(TypeKind::Struct, container, name)
	}

	pub fn enumeration(container: &str, name: &str) -> Self {
		Self::new(TypeKind::Enum, container, name)
	}

	/// Names the super type, resolved by name in any container.
	pub fn with_super(mut self, super_type: &str) -> Self {
		self.super_type = Some(super_type.into());
		self
	}

	pub fn with_fingerprint(mut self, size: usize, checksum: u32) -> Self {
		self.fingerprint = Fingerprint { size, checksum };
		self
	}

	/// Object reference fields declared directly on this type.
	pub fn with_references<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
		self.references = fields.into_iter().map(Box::from).collect();
		self
	}

	/// Enumerator names, for enums.
	pub fn with_variants<'a>(mut self, variants: impl IntoIterator<Item = &'a str>) -> Self {
		self.variants = variants.into_iter().map(Box::from).collect();
		self
	}

	/// Hook run on the default instance right after it is created. Classes only.
	pub fn with_defaults(
		mut self,
		hook: impl Fn(&mut Bootstrap, DefaultInstance) -> Result<(), BootstrapError> + Send + Sync + 'static,
	) -> Self {
		self.defaults = Some(Arc::new(hook));
		self
	}

	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	pub fn container(&self) -> &str {
		&self.container
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn super_type(&self) -> Option<&str> {
		self.super_type.as_deref()
	}

	pub fn fingerprint(&self) -> Fingerprint {
		self.fingerprint
	}
}

impl fmt::Debug for TypeSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeSpec")
			.field("kind", &self.kind)
			.field("container", &self.container)
			.field("name", &self.name)
			.field("super_type", &self.super_type)
			.field("fingerprint", &self.fingerprint)
			.field("references", &self.references)
			.field("variants", &self.variants)
			.field("defaults", &self.defaults.is_some())
			.finish()
	}
}

/// A queued, run-once construction thunk.
///
/// The factory must return an object of [`Self::kind`] that is named and owned
/// by a container when it returns.
pub struct TypeDescriptor {
	kind: TypeKind,
	container: Box<str>,
	name: Box<str>,
	factory: Factory,
}

impl TypeDescriptor {
	pub fn new(
		kind: TypeKind,
		container: &str,
		name: &str,
		factory: impl FnOnce(&mut Bootstrap) -> Result<ObjectId, BootstrapError> + Send + 'static,
	) -> Self {
		Self {
			kind,
			container: container.into(),
			name: name.into(),
			factory: Box::new(factory),
		}
	}

	pub fn kind(&self) -> TypeKind {
		self.kind
	}

	pub fn container(&self) -> &str {
		&self.container
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn into_parts(self) -> (TypeKind, Box<str>, Box<str>, Factory) {
		(self.kind, self.container, self.name, self.factory)
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("kind", &self.kind)
			.field("container", &self.container)
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}
