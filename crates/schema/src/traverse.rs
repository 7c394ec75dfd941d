//! State of one schema traversal.

use std::any::TypeId;

use rustc_hash::FxHashSet;

use crate::reflect::TypeIdentity;
use crate::registry::Registry;

/// A single walk over a type graph.
///
/// Carries the registry that receives nested layouts and the set of structs
/// whose layout is still being built. A struct met again while it is on that
/// set is referenced by name instead of being re-entered, and remembered as
/// referenced so its message is emitted even when it is only embedded.
pub struct Traversal<'r> {
	registry: &'r mut Registry,
	in_progress: FxHashSet<TypeId>,
	referenced: FxHashSet<TypeId>,
}

impl<'r> Traversal<'r> {
	pub fn new(registry: &'r mut Registry) -> Self {
		Self {
			registry,
			in_progress: FxHashSet::default(),
			referenced: FxHashSet::default(),
		}
	}

	pub fn registry(&self) -> &Registry {
		self.registry
	}

	pub(crate) fn registry_mut(&mut self) -> &mut Registry {
		self.registry
	}

	pub fn in_progress(&self, ty: &TypeIdentity) -> bool {
		self.in_progress.contains(&ty.id)
	}

	pub(crate) fn enter(&mut self, ty: TypeIdentity) {
		self.in_progress.insert(ty.id);
	}

	pub(crate) fn leave(&mut self, ty: TypeIdentity) {
		self.in_progress.remove(&ty.id);
	}

	pub(crate) fn mark_referenced(&mut self, ty: &TypeIdentity) {
		self.referenced.insert(ty.id);
	}

	/// Whether a cycle reference to `ty` was emitted during this walk.
	pub fn is_referenced(&self, ty: &TypeIdentity) -> bool {
		self.referenced.contains(&ty.id)
	}
}
