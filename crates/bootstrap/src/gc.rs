//! GC reference metadata.
//!
//! # Role
//!
//! The collector walks objects using a per-class token stream listing every
//! outgoing reference. A class's stream is its super class's stream followed
//! by the class's own reference fields; root classes start from the implicit
//! links every object has.
//!
//! # Invariants
//!
//! - A class's schema is assembled once and never rebuilt.
//!   - Enforced in: [`GcMetadata::assemble_class`].
//!   - Tested by: `tests::schemas_extend_super_schemas`
//!   - Failure symptom: collector sees duplicated reference tokens.
//!
//! - A batch assembly runs at most once per epoch.
//!   - Enforced in: the engine's epoch finalization.
//!   - Tested by: `invariants::test_gc_assembly_once_per_epoch`
//!   - Failure symptom: [`GcMetadata::assembly_count`] grows faster than epochs.

use std::sync::Arc;

use kiln_object::{Name, ObjectId};
use rustc_hash::FxHashMap as HashMap;
use tracing::debug;

use crate::descriptor::TypeKind;
use crate::types::TypeTable;

/// One outgoing reference walked by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceToken {
	/// Link from an object to its class.
	ClassLink,
	/// Link from an object to its outer.
	OuterLink,
	/// Optional link to an external container.
	ExternalContainer,
	/// Reference field declared on a class.
	Field { name: Name, declared_by: ObjectId },
}

impl ReferenceToken {
	/// Links that keep their target alive regardless of reachability.
	pub const fn is_persistent(self) -> bool {
		matches!(self, ReferenceToken::ClassLink | ReferenceToken::OuterLink)
	}
}

/// Token stream for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSchema {
	tokens: Vec<ReferenceToken>,
}

impl ReferenceSchema {
	fn root() -> Self {
		Self {
			tokens: vec![
				ReferenceToken::ClassLink,
				ReferenceToken::OuterLink,
				ReferenceToken::ExternalContainer,
			],
		}
	}

	pub fn tokens(&self) -> &[ReferenceToken] {
		&self.tokens
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

/// Assembled schemas by class.
#[derive(Debug, Default)]
pub struct GcMetadata {
	schemas: HashMap<ObjectId, Arc<ReferenceSchema>>,
	assemblies: usize,
}

impl GcMetadata {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn schema(&self, class: ObjectId) -> Option<&ReferenceSchema> {
		self.schemas.get(&class).map(Arc::as_ref)
	}

	/// Number of batch assemblies run so far.
	pub fn assembly_count(&self) -> usize {
		self.assemblies
	}

	/// Number of classes with a schema.
	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}

	/// Assembles schemas for every class in `types` that lacks one. Returns the
	/// number of classes assembled.
	pub(crate) fn assemble(&mut self, types: &TypeTable) -> usize {
		self.assemblies += 1;
		let pending: Vec<ObjectId> = types
			.iter()
			.filter(|(id, ty)| ty.kind == TypeKind::Class && !self.schemas.contains_key(*id))
			.map(|(&id, _)| id)
			.collect();
		for &class in &pending {
			self.assemble_class(types, class);
		}
		debug!(
			assembled = pending.len(),
			total = self.schemas.len(),
			pass = self.assemblies,
			"assembled GC reference metadata"
		);
		pending.len()
	}

	/// Assembles one class and, first, any super class still missing a schema.
	pub(crate) fn assemble_class(&mut self, types: &TypeTable, class: ObjectId) -> Arc<ReferenceSchema> {
		let mut chain = Vec::new();
		let mut base = None;
		let mut cursor = Some(class);
		while let Some(current) = cursor {
			if let Some(schema) = self.schemas.get(&current) {
				base = Some(Arc::clone(schema));
				break;
			}
			if chain.contains(&current) {
				break;
			}
			chain.push(current);
			cursor = types.get(&current).and_then(|t| t.super_type);
		}

		for current in chain.into_iter().rev() {
			let mut tokens = match &base {
				Some(schema) => schema.tokens.clone(),
				None => ReferenceSchema::root().tokens,
			};
			if let Some(ty) = types.get(&current) {
				tokens.extend(ty.references.iter().map(|&name| ReferenceToken::Field {
					name,
					declared_by: current,
				}));
			}
			let schema = Arc::new(ReferenceSchema { tokens });
			self.schemas.insert(current, Arc::clone(&schema));
			base = Some(schema);
		}

		base.unwrap_or_else(|| Arc::new(ReferenceSchema::root()))
	}
}
