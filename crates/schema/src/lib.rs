//! Schema derivation for HTTP services.
//!
//! Registering a route hands this crate the request and response types of
//! its handler. From their [`Reflect`] descriptions it derives message
//! layouts, records one service definition per endpoint, and renders the
//! accumulated registry as protobuf-flavoured IDL text.
//!
//! # Pipeline
//!
//! 1. [`Registry::register_route`] resolves the request and response types
//!    through a [`Traversal`], which builds layouts ([`layout`]) and maps field
//!    types to IDL expressions ([`idl_type`]), registering nested structs as it
//!    goes.
//! 2. With enveloping on, the response layout is wrapped by
//!    [`envelope::wrap_layout`].
//! 3. [`RenderCache`] renders the registry once through [`IdlDocument`].
//!
//! # Concurrency
//!
//! [`Registry`] is plain data mutated through `&mut`; a service that
//! registers routes from several threads wraps it in a lock. [`RenderCache`]
//! is safe to share and renders at most once.

pub mod envelope;
pub mod error;
pub mod idl_type;
pub mod layout;
pub mod naming;
pub mod reflect;
pub mod registry;
pub mod render;
pub mod traverse;

pub use error::{Result, SchemaError};
pub use layout::{FieldMeta, StructLayout};
pub use naming::NamePolicy;
pub use reflect::{
	AnyObject, Empty, Field, OpaqueKind, Primitive, Reflect, Shape, ShapeFn, StructShape, Tag,
	TypeIdentity,
};
pub use registry::{
	Registry, RegistryOptions, RouteSpec, ServiceDefinition, ServiceEndpoint,
};
pub use render::{IdlDocument, PathParams, RenderCache, RenderOptions, render};
pub use traverse::Traversal;

#[cfg(test)]
pub(crate) mod fixtures;
