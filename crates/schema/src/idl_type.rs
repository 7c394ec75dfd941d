//! Type-to-IDL-type mapping.
//!
//! Rules, in priority order:
//!
//! 1. Pointers are unwrapped.
//! 2. Sequences become `repeated E`. A map element degrades to the dynamic
//!    placeholder; a sequence element is an error.
//! 3. Maps become `map<K,V>` with the same treatment of `V`. Keys must be
//!    scalar: messages, the dynamic placeholder and composites are errors.
//! 4. Opaque kinds become the dynamic placeholder.
//! 5. Structs are built, registered and referenced by display name; a struct
//!    already being built is referenced without re-entering it.
//! 6. Primitives come from [`primitive_type`].

use tracing::trace;

use crate::error::{Result, SchemaError};
use crate::reflect::{Primitive, Shape, StructShape};
use crate::traverse::Traversal;

/// The opaque/dynamic placeholder type.
pub const ANY_TYPE: &str = "google.protobuf.Any";

const REPEATED_PREFIX: &str = "repeated ";
const MAP_PREFIX: &str = "map<";

/// Fixed primitive table. `i128`/`u128` have no counterpart.
///
/// Platform-width integers are narrowed to 32 bits unless `widen_platform`
/// is set.
pub fn primitive_type(primitive: Primitive, widen_platform: bool) -> Option<&'static str> {
	let idl = match primitive {
		Primitive::Bool => "bool",
		Primitive::String => "string",
		Primitive::I8 => "int8",
		Primitive::I16 => "int16",
		Primitive::I32 => "int32",
		Primitive::I64 => "int64",
		Primitive::U8 => "uint8",
		Primitive::U16 => "uint16",
		Primitive::U32 => "uint32",
		Primitive::U64 => "uint64",
		Primitive::F32 => "float",
		Primitive::F64 => "double",
		Primitive::Isize if widen_platform => "int64",
		Primitive::Isize => "int32",
		Primitive::Usize if widen_platform => "uint64",
		Primitive::Usize => "uint32",
		Primitive::I128 | Primitive::U128 => return None,
	};
	Some(idl)
}

fn is_repeated(expr: &str) -> bool {
	expr.starts_with(REPEATED_PREFIX)
}

fn is_map(expr: &str) -> bool {
	expr.starts_with(MAP_PREFIX)
}

/// Element of a sequence or value of a map.
fn nested(container: &'static str, inner: String) -> Result<String> {
	if is_map(&inner) {
		Ok(ANY_TYPE.to_owned())
	} else if is_repeated(&inner) {
		Err(SchemaError::NestedRepeated { container, inner })
	} else {
		Ok(inner)
	}
}

impl Traversal<'_> {
	/// Maps a shape to its IDL type expression, registering any struct
	/// layouts met on the way.
	pub fn idl_type(&mut self, shape: Shape) -> Result<String> {
		match shape {
			Shape::Pointer(inner) => self.idl_type(inner()),
			Shape::Sequence(element) => {
				let element = self.idl_type(element())?;
				let element = nested("repeated", element)?;
				Ok(format!("{REPEATED_PREFIX}{element}"))
			}
			Shape::Map { key, value } => {
				let key = self.map_key(key())?;
				let value = self.idl_type(value())?;
				let value = nested("map", value)?;
				Ok(format!("{MAP_PREFIX}{key},{value}>"))
			}
			Shape::Opaque(_) => Ok(ANY_TYPE.to_owned()),
			Shape::Struct(shape) => self.struct_reference(shape),
			Shape::Primitive(primitive) => {
				let widen = self.registry().options().widen_platform_ints;
				primitive_type(primitive, widen)
					.map(str::to_owned)
					.ok_or(SchemaError::UnsupportedType(primitive))
			}
		}
	}

	/// Keys are scalars. Messages are rejected before they are built, so a
	/// struct key registers nothing.
	fn map_key(&mut self, key: Shape) -> Result<String> {
		let key = key.strip_pointers();
		if let Shape::Struct(shape) = &key {
			return Err(SchemaError::InvalidMapKey {
				key: self.registry().display_name(shape.ty.name),
			});
		}
		let key = self.idl_type(key)?;
		if is_map(&key) || is_repeated(&key) || key == ANY_TYPE {
			return Err(SchemaError::InvalidMapKey { key });
		}
		Ok(key)
	}

	fn struct_reference(&mut self, shape: StructShape) -> Result<String> {
		if self.in_progress(&shape.ty) {
			trace!(ty = shape.ty.name, "cycle guard: referencing type under construction");
			self.mark_referenced(&shape.ty);
			return Ok(self.registry().display_name(shape.ty.name));
		}
		let layout = self.build(shape)?;
		let registry = self.registry_mut();
		registry.register_layout(layout.clone());
		Ok(registry.display_name(&layout.name))
	}
}
