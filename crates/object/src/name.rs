//! Name interning.
//!
//! Names are dense handles into a [`NameTable`]. The table is plain memory and
//! can be used before the object system is initialized, which is what lets
//! pending registrants carry their declared names from the start.

use rustc_hash::FxHashMap as HashMap;

/// Interned name handle.
///
/// [`Name::NONE`] is the empty name; interning `""` or `"None"` yields it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name(u32);

impl Name {
	/// The empty name.
	pub const NONE: Name = Name(0);

	/// Returns true for [`Name::NONE`].
	#[inline]
	pub const fn is_none(self) -> bool {
		self.0 == 0
	}

	/// Returns the raw table index.
	pub const fn as_u32(self) -> u32 {
		self.0
	}
}

const NONE_STR: &str = "None";

/// Append-only string interner.
#[derive(Debug, Clone)]
pub struct NameTable {
	strings: Vec<Box<str>>,
	lookup: HashMap<Box<str>, Name>,
}

impl Default for NameTable {
	fn default() -> Self {
		Self::new()
	}
}

impl NameTable {
	/// Creates a table that only knows [`Name::NONE`].
	pub fn new() -> Self {
		let mut lookup = HashMap::default();
		lookup.insert(Box::from(NONE_STR), Name::NONE);
		Self {
			strings: vec![Box::from(NONE_STR)],
			lookup,
		}
	}

	/// Interns `s`, returning the existing handle when already present.
	pub fn intern(&mut self, s: &str) -> Name {
		if s.is_empty() {
			return Name::NONE;
		}
		if let Some(&name) = self.lookup.get(s) {
			return name;
		}
		let name = Name(self.strings.len() as u32);
		self.strings.push(Box::from(s));
		self.lookup.insert(Box::from(s), name);
		name
	}

	/// Looks up `s` without interning it.
	pub fn get(&self, s: &str) -> Option<Name> {
		if s.is_empty() {
			return Some(Name::NONE);
		}
		self.lookup.get(s).copied()
	}

	/// Resolves a handle back to its string. Foreign handles resolve to `"None"`.
	pub fn resolve(&self, name: Name) -> &str {
		self.strings
			.get(name.0 as usize)
			.map(|s| &**s)
			.unwrap_or(NONE_STR)
	}

	/// Number of interned strings, including `"None"`.
	pub fn len(&self) -> usize {
		self.strings.len()
	}

	/// Always false: the table is seeded with `"None"`.
	pub fn is_empty(&self) -> bool {
		self.strings.is_empty()
	}
}

/// Strips the one-letter native class prefix and a `DEPRECATED_` marker.
///
/// `"UActor"` becomes `"Actor"`, `"UDEPRECATED_Widget"` becomes `"Widget"`.
pub fn strip_class_prefix(native_name: &str) -> &str {
	const DEPRECATED_PREFIX: &str = "DEPRECATED_";
	let mut chars = native_name.chars();
	if chars.next().is_none() {
		return native_name;
	}
	let rest = chars.as_str();
	rest.strip_prefix(DEPRECATED_PREFIX).unwrap_or(rest)
}
