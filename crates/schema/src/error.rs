//! Error types for schema derivation.

use thiserror::Error;

use crate::reflect::Primitive;

/// A type shape the IDL cannot express.
///
/// These reflect a mismatch between a host type and the target IDL, so
/// callers are expected to surface them while routes are being registered
/// rather than recover from them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
	/// A `repeated` expression would be nested directly inside a sequence or
	/// a map value.
	#[error("{container} field cannot directly nest `{inner}`")]
	NestedRepeated {
		container: &'static str,
		inner: String,
	},

	/// A map key resolved to a composite expression.
	#[error("map key must be a scalar type, got `{key}`")]
	InvalidMapKey { key: String },

	/// A primitive without a mapping in the type table.
	#[error("no IDL type for primitive `{0}`")]
	UnsupportedType(Primitive),

	/// A request or response type that is neither a struct nor a map.
	#[error("not a struct: {type_name}")]
	NotAStruct { type_name: &'static str },

	/// A struct embeds itself, which would flatten forever.
	#[error("struct `{type_name}` embeds itself")]
	RecursiveEmbedding { type_name: &'static str },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
