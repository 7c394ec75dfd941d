//! Message layouts and the struct layout builder.
//!
//! A [`StructLayout`] is the flattened field list of one struct: private
//! fields dropped, embedded structs spliced in place, every field carrying its
//! external name and rendered IDL type.
//!
//! # External names
//!
//! The builder scans [`TAG_NAMESPACES`] in order and takes the first tag that
//! is present. A `-` value removes the field regardless of any lower-priority
//! tag; an absent or empty name falls back to the declared identifier.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::error::{Result, SchemaError};
use crate::reflect::{Field, Shape, StructShape, TypeIdentity};
use crate::traverse::Traversal;

/// Tag namespaces consulted for a field's external name, highest priority first.
pub const TAG_NAMESPACES: [&str; 3] = ["json", "form", "uri"];

/// Tag value that removes a field.
pub const SKIP_MARKER: &str = "-";

/// Name of the shared layout used for every field-less struct.
pub const NULL_LAYOUT: &str = "Null";

/// Name of the open layout used for the "any JSON object" type.
pub const ANY_LAYOUT: &str = "Any";

/// One emitted message field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMeta {
	pub ty: TypeIdentity,
	/// Declared identifier.
	pub ident: &'static str,
	/// Serialized name.
	pub name: String,
	/// IDL type expression.
	pub form: String,
}

/// A named message schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructLayout {
	pub ty: TypeIdentity,
	/// Canonical name; the registry deduplicates on it and display names are
	/// derived from it.
	pub name: String,
	pub fields: Vec<FieldMeta>,
}

impl StructLayout {
	fn sentinel(name: &str) -> Self {
		Self {
			ty: TypeIdentity::of::<()>(),
			name: name.to_owned(),
			fields: Vec::new(),
		}
	}

	/// The shared empty message.
	pub fn null() -> Self {
		Self::sentinel(NULL_LAYOUT)
	}

	/// The open/dynamic object message.
	pub fn any() -> Self {
		Self::sentinel(ANY_LAYOUT)
	}

	pub fn field(&self, name: &str) -> Option<&FieldMeta> {
		self.fields.iter().find(|field| field.name == name)
	}
}

impl Traversal<'_> {
	/// Resolves a request or response type to its layout.
	///
	/// Pointers are unwrapped; maps resolve to the open `Any` layout. The
	/// layout is not registered.
	pub fn resolve(&mut self, type_name: &'static str, shape: Shape) -> Result<Arc<StructLayout>> {
		match shape.strip_pointers() {
			Shape::Struct(shape) => self.build(shape),
			Shape::Map { .. } => Ok(Arc::new(StructLayout::any())),
			_ => Err(SchemaError::NotAStruct { type_name }),
		}
	}

	/// Builds the layout of a struct, reusing a registered one when present.
	pub fn build(&mut self, shape: StructShape) -> Result<Arc<StructLayout>> {
		if let Some(layout) = self.registry().layout(shape.ty.name) {
			return Ok(Arc::clone(layout));
		}
		if shape.fields.is_empty() {
			return Ok(Arc::new(StructLayout::null()));
		}

		self.enter(shape.ty);
		let fields = self.collect_fields(&shape.fields);
		self.leave(shape.ty);

		let layout = StructLayout {
			ty: shape.ty,
			name: shape.ty.name.to_owned(),
			fields: fields?,
		};
		warn_duplicate_names(&layout);
		Ok(Arc::new(layout))
	}

	fn collect_fields(&mut self, fields: &[Field]) -> Result<Vec<FieldMeta>> {
		let mut out = Vec::with_capacity(fields.len());
		for field in fields {
			if !field.exported {
				continue;
			}
			if field.embedded {
				out.extend(self.embedded_fields(field)?);
				continue;
			}
			let Some(name) = external_name(field) else {
				continue;
			};
			let form = self.idl_type((field.shape)())?;
			out.push(FieldMeta {
				ty: field.ty,
				ident: field.ident,
				name,
				form,
			});
		}
		Ok(out)
	}

	/// Fields promoted from an embedded struct. Embedding a non-struct
	/// contributes nothing. The embedded struct gets a message of its own only
	/// when one of its fields refers back to it.
	fn embedded_fields(&mut self, field: &Field) -> Result<Vec<FieldMeta>> {
		let Shape::Struct(inner) = (field.shape)().strip_pointers() else {
			return Ok(Vec::new());
		};
		if self.in_progress(&inner.ty) {
			return Err(SchemaError::RecursiveEmbedding {
				type_name: inner.ty.name,
			});
		}
		let ty = inner.ty;
		let layout = self.build(inner)?;
		// A self-referencing embedded struct is named by its own fields.
		if self.is_referenced(&ty) {
			self.registry_mut().register_layout(Arc::clone(&layout));
		}
		Ok(layout.fields.clone())
	}
}

/// External name of a field, or `None` when a tag removes it.
pub fn external_name(field: &Field) -> Option<String> {
	let tag = TAG_NAMESPACES
		.iter()
		.find_map(|namespace| field.lookup_tag(namespace));

	match tag {
		Some(SKIP_MARKER) => None,
		Some(value) => {
			let name = value.split_once(',').map_or(value, |(name, _)| name);
			let name = if name.is_empty() { field.ident } else { name };
			Some(name.to_owned())
		}
		None => Some(field.ident.to_owned()),
	}
}

fn warn_duplicate_names(layout: &StructLayout) {
	let mut seen = FxHashSet::default();
	for field in &layout.fields {
		if !seen.insert(field.name.as_str()) {
			warn!(
				layout = %layout.name,
				field = %field.name,
				"duplicate external field name"
			);
		}
	}
}
