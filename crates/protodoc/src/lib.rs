//! Typed HTTP routes that document themselves.
//!
//! Handlers are plain functions from a request type to a response type.
//! Registering one through a [`RouteGroup`] derives protobuf-style messages for
//! both types and an rpc for the route; [`Service::render`] returns the whole
//! service as IDL text, and [`RouteGroup::serve_doc`] exposes that text as a
//! route of its own.
//!
//! ```
//! use protodoc::{Config, Message, Service};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize, Message)]
//! pub struct GreetReq {
//!     #[message(uri = "name")]
//!     pub name: String,
//! }
//!
//! #[derive(Serialize, Message)]
//! pub struct GreetRsp {
//!     pub greet: String,
//! }
//!
//! fn handle_greet(req: GreetReq) -> anyhow::Result<GreetRsp> {
//!     Ok(GreetRsp { greet: format!("hello {}!", req.name) })
//! }
//!
//! let service = Service::new(Config::default());
//! service.group("/api/v1").get("/greet/:name", handle_greet, &[]).unwrap();
//! assert!(service.render().contains("rpc HandleGreet(GreetReq) returns (GreetRspWrap)"));
//! ```
//!
//! Request input is a single JSON object; adapters for a concrete HTTP
//! framework merge headers, path parameters, query and body into it before
//! calling [`Route::call`] (or [`Service::dispatch`]).

extern crate self as protodoc;

pub mod config;
pub mod error;
pub mod method;
pub mod options;
pub mod reply;
pub mod service;

pub use config::Config;
pub use error::{ApiError, ConfigError, Result, RouteError};
pub use method::Method;
pub use options::{HandleOption, RouteConfig};
pub use protodoc_derive::Message;
pub use protodoc_schema::{
	self as schema, AnyObject, Empty, NamePolicy, PathParams, Reflect, SchemaError, reflect,
};
pub use reply::{Envelope, Reply, ReplyBody};
pub use service::{Route, RouteGroup, Service, empty_handler, join_paths};
