//! Static type descriptors.
//!
//! Rust has no runtime reflection, so every type that can appear in a request
//! or response describes itself through [`Reflect`]. The description is a
//! [`Shape`] tree whose children are reached through [`ShapeFn`] pointers, so a
//! self-referential type never materializes an infinite value: the traversal
//! only calls into a child when it actually descends.
//!
//! Structs normally get their implementation from `#[derive(Message)]`; the
//! impls in this module cover the standard library, `indexmap` and `serde_json`.

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lazily produces the shape of a child type.
pub type ShapeFn = fn() -> Shape;

/// A type that can describe its own structure.
pub trait Reflect: 'static {
	/// Returns the structural description of `Self`.
	fn shape() -> Shape;
}

/// Identity of a source type.
///
/// `name` is the canonical name reported by [`type_name`] and is what layouts
/// are deduplicated on; `id` is what the cycle guard tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
	pub id: TypeId,
	pub name: &'static str,
}

impl TypeIdentity {
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}
}

/// Structural description of a type.
#[derive(Clone, Debug)]
pub enum Shape {
	Primitive(Primitive),
	/// Indirection (`Box`, `Option`, `Arc`, references). Always unwrapped.
	Pointer(ShapeFn),
	Sequence(ShapeFn),
	Map {
		key: ShapeFn,
		value: ShapeFn,
	},
	/// Data whose shape cannot be described statically.
	Opaque(OpaqueKind),
	Struct(StructShape),
}

impl Shape {
	/// Follows pointer indirections until a non-pointer shape is reached.
	pub fn strip_pointers(self) -> Shape {
		let mut shape = self;
		while let Shape::Pointer(inner) = shape {
			shape = inner();
		}
		shape
	}
}

/// Scalar kinds with a fixed IDL counterpart (or a deliberate lack of one).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
	Bool,
	String,
	I8,
	I16,
	I32,
	I64,
	I128,
	Isize,
	U8,
	U16,
	U32,
	U64,
	U128,
	Usize,
	F32,
	F64,
}

impl fmt::Display for Primitive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Primitive::Bool => "bool",
			Primitive::String => "string",
			Primitive::I8 => "i8",
			Primitive::I16 => "i16",
			Primitive::I32 => "i32",
			Primitive::I64 => "i64",
			Primitive::I128 => "i128",
			Primitive::Isize => "isize",
			Primitive::U8 => "u8",
			Primitive::U16 => "u16",
			Primitive::U32 => "u32",
			Primitive::U64 => "u64",
			Primitive::U128 => "u128",
			Primitive::Usize => "usize",
			Primitive::F32 => "f32",
			Primitive::F64 => "f64",
		};
		f.write_str(name)
	}
}

/// Kinds that always render as the dynamic placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpaqueKind {
	/// Untyped JSON value.
	Dynamic,
	/// Trait object.
	Interface,
	Channel,
	Function,
	RawPointer,
}

/// Field list of a struct, in declaration order.
#[derive(Clone, Debug)]
pub struct StructShape {
	pub ty: TypeIdentity,
	pub fields: Vec<Field>,
}

impl StructShape {
	pub fn new<T: ?Sized + 'static>(fields: Vec<Field>) -> Self {
		Self {
			ty: TypeIdentity::of::<T>(),
			fields,
		}
	}
}

/// One declared struct field.
#[derive(Clone, Debug)]
pub struct Field {
	/// Declared identifier.
	pub ident: &'static str,
	pub ty: TypeIdentity,
	/// Visible outside the defining module.
	pub exported: bool,
	/// Flattened into the enclosing message instead of nested.
	pub embedded: bool,
	pub tags: Vec<Tag>,
	pub shape: ShapeFn,
}

impl Field {
	/// Creates an exported, non-embedded field of type `T` without tags.
	pub fn of<T: Reflect + ?Sized>(ident: &'static str) -> Self {
		Self {
			ident,
			ty: TypeIdentity::of::<T>(),
			exported: true,
			embedded: false,
			tags: Vec::new(),
			shape: T::shape,
		}
	}

	pub fn exported(mut self, exported: bool) -> Self {
		self.exported = exported;
		self
	}

	pub fn embedded(mut self, embedded: bool) -> Self {
		self.embedded = embedded;
		self
	}

	/// Attaches a tag in `namespace`. The value follows struct-tag conventions:
	/// the name is everything before the first `,` and `-` means "skip".
	pub fn tag(mut self, namespace: &'static str, value: &'static str) -> Self {
		self.tags.push(Tag { namespace, value });
		self
	}

	pub fn lookup_tag(&self, namespace: &str) -> Option<&'static str> {
		self.tags
			.iter()
			.find(|tag| tag.namespace == namespace)
			.map(|tag| tag.value)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
	pub namespace: &'static str,
	pub value: &'static str,
}

/// The catch-all "any JSON object" type.
///
/// Used as a request or response it resolves to the open `Any` message; as a
/// field it is a plain string-keyed map of dynamic values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnyObject(pub serde_json::Map<String, serde_json::Value>);

impl Reflect for AnyObject {
	fn shape() -> Shape {
		<serde_json::Map<String, serde_json::Value> as Reflect>::shape()
	}
}

/// A message without fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

impl Reflect for Empty {
	fn shape() -> Shape {
		Shape::Struct(StructShape::new::<Self>(Vec::new()))
	}
}

macro_rules! reflect_primitive {
	($($ty:ty => $prim:ident),* $(,)?) => {
		$(
			impl Reflect for $ty {
				fn shape() -> Shape {
					Shape::Primitive(Primitive::$prim)
				}
			}
		)*
	};
}

reflect_primitive! {
	bool => Bool,
	String => String,
	str => String,
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	i128 => I128,
	isize => Isize,
	u8 => U8,
	u16 => U16,
	u32 => U32,
	u64 => U64,
	u128 => U128,
	usize => Usize,
	f32 => F32,
	f64 => F64,
}

impl Reflect for Cow<'static, str> {
	fn shape() -> Shape {
		Shape::Primitive(Primitive::String)
	}
}

impl Reflect for () {
	fn shape() -> Shape {
		Shape::Struct(StructShape::new::<Self>(Vec::new()))
	}
}

macro_rules! reflect_pointer {
	($($ty:ident),*) => {
		$(
			impl<T: Reflect + ?Sized> Reflect for $ty<T> {
				fn shape() -> Shape {
					Shape::Pointer(T::shape)
				}
			}
		)*
	};
}

reflect_pointer!(Box, Rc, Arc);

impl<T: Reflect> Reflect for Option<T> {
	fn shape() -> Shape {
		Shape::Pointer(T::shape)
	}
}

impl<T: Reflect + ?Sized> Reflect for &'static T {
	fn shape() -> Shape {
		Shape::Pointer(T::shape)
	}
}

impl<T: Reflect> Reflect for Vec<T> {
	fn shape() -> Shape {
		Shape::Sequence(T::shape)
	}
}

impl<T: Reflect> Reflect for VecDeque<T> {
	fn shape() -> Shape {
		Shape::Sequence(T::shape)
	}
}

impl<T: Reflect> Reflect for [T] {
	fn shape() -> Shape {
		Shape::Sequence(T::shape)
	}
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
	fn shape() -> Shape {
		Shape::Sequence(T::shape)
	}
}

impl<T: Reflect, S: 'static> Reflect for HashSet<T, S> {
	fn shape() -> Shape {
		Shape::Sequence(T::shape)
	}
}

impl<T: Reflect> Reflect for BTreeSet<T> {
	fn shape() -> Shape {
		Shape::Sequence(T::shape)
	}
}

impl<K: Reflect, V: Reflect, S: 'static> Reflect for HashMap<K, V, S> {
	fn shape() -> Shape {
		Shape::Map {
			key: K::shape,
			value: V::shape,
		}
	}
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
	fn shape() -> Shape {
		Shape::Map {
			key: K::shape,
			value: V::shape,
		}
	}
}

impl<K: Reflect, V: Reflect, S: 'static> Reflect for IndexMap<K, V, S> {
	fn shape() -> Shape {
		Shape::Map {
			key: K::shape,
			value: V::shape,
		}
	}
}

impl Reflect for serde_json::Map<String, serde_json::Value> {
	fn shape() -> Shape {
		Shape::Map {
			key: String::shape,
			value: serde_json::Value::shape,
		}
	}
}

impl Reflect for serde_json::Value {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::Dynamic)
	}
}

impl Reflect for dyn Any {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::Interface)
	}
}

impl Reflect for dyn Any + Send {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::Interface)
	}
}

impl Reflect for dyn Any + Send + Sync {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::Interface)
	}
}

impl<T: 'static> Reflect for Sender<T> {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::Channel)
	}
}

impl<T: 'static> Reflect for SyncSender<T> {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::Channel)
	}
}

impl<T: 'static> Reflect for Receiver<T> {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::Channel)
	}
}

impl<T: ?Sized + 'static> Reflect for *const T {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::RawPointer)
	}
}

impl<T: ?Sized + 'static> Reflect for *mut T {
	fn shape() -> Shape {
		Shape::Opaque(OpaqueKind::RawPointer)
	}
}

macro_rules! reflect_fn_pointer {
	($($arg:ident),*) => {
		impl<R: 'static, $($arg: 'static),*> Reflect for fn($($arg),*) -> R {
			fn shape() -> Shape {
				Shape::Opaque(OpaqueKind::Function)
			}
		}
	};
}

reflect_fn_pointer!();
reflect_fn_pointer!(A);
reflect_fn_pointer!(A, B);
reflect_fn_pointer!(A, B, C);
reflect_fn_pointer!(A, B, C, D);
