//! Service bootstrap context and route registration.
//!
//! A [`Service`] owns the schema registry, the rendered document and the
//! route table. Routes are added through [`RouteGroup`]s; each registration
//! derives the request and response messages, records the rpc, and stores a
//! type-erased handler that turns a JSON input into a [`Reply`].
//!
//! # Locking
//!
//! The route table lock is always taken before the registry lock.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};
use protodoc_schema::naming::{handler_name, is_anonymous, route_operation};
use protodoc_schema::{Empty, Reflect, Registry, RenderCache, RenderOptions, RouteSpec};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{Result, RouteError};
use crate::method::Method;
use crate::options::{HandleOption, RouteConfig};
use crate::reply::{Failure, Reply, STATUS_NOT_FOUND, STATUS_OK};

/// Registry plus its frozen rendering, shared with the document route.
struct Schema {
	registry: RwLock<Registry>,
	document: RenderCache,
	options: RenderOptions,
}

impl Schema {
	fn render(&self) -> &str {
		let registry = self.registry.read();
		self.document.get_or_render(&registry, &self.options)
	}
}

type Invoke = dyn Fn(Value) -> std::result::Result<Value, Failure> + Send + Sync;

enum Endpoint {
	Typed(Box<Invoke>),
	Document(Arc<Schema>),
}

/// A registered route.
pub struct Route {
	method: Method,
	path: String,
	operation: String,
	config: RouteConfig,
	endpoint: Endpoint,
}

impl fmt::Debug for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("operation", &self.operation)
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

impl Route {
	pub fn method(&self) -> Method {
		self.method
	}

	/// Full path pattern, e.g. `/api/v1/users/:id`.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Canonical operation name: the override, else the handler's path, else
	/// (for closures) a name built from the method and path.
	pub fn operation(&self) -> &str {
		&self.operation
	}

	pub fn config(&self) -> &RouteConfig {
		&self.config
	}

	/// Whether the route appears in the IDL. The document route does not.
	pub fn is_documented(&self) -> bool {
		matches!(self.endpoint, Endpoint::Typed(_))
	}

	/// Handles one request whose header, path, query and body values have
	/// been merged into `input`. `null` is treated as an empty object.
	pub fn call(&self, input: Value) -> Reply {
		let invoke = match &self.endpoint {
			Endpoint::Typed(invoke) => invoke,
			Endpoint::Document(schema) => return Reply::text(STATUS_OK, schema.render()),
		};
		let input = match input {
			Value::Null => Value::Object(Map::new()),
			input => input,
		};

		match invoke(input) {
			Ok(payload) => self.config.success(payload),
			Err(failure) => {
				self.log_failure(&failure);
				self.config.failure(&failure)
			}
		}
	}

	fn log_failure(&self, failure: &Failure) {
		let (method, path) = (self.method, self.path.as_str());
		match failure {
			Failure::Bind(err) => debug!(%method, path, error = %err, "request failed to bind"),
			Failure::Handler(err) => {
				let error = format!("{err:#}");
				debug!(%method, path, %error, "handler failed");
			}
			Failure::Encode(err) => warn!(%method, path, error = %err, "response failed to serialize"),
		}
	}

	/// Matches a concrete path against this route's pattern, returning the
	/// captured `:param` and `*wildcard` values.
	pub fn match_path(&self, path: &str) -> Option<Map<String, Value>> {
		let mut params = Map::new();
		let mut actual = path.split('/');
		for expected in self.path.split('/') {
			if let Some(name) = expected.strip_prefix('*') {
				let rest: Vec<_> = actual.collect();
				params.insert(name.to_owned(), Value::String(format!("/{}", rest.join("/"))));
				return Some(params);
			}
			let segment = actual.next()?;
			if let Some(name) = expected.strip_prefix(':') {
				if segment.is_empty() {
					return None;
				}
				params.insert(name.to_owned(), Value::String(segment.to_owned()));
			} else if expected != segment {
				return None;
			}
		}
		actual.next().is_none().then_some(params)
	}
}

/// Erases a typed handler into a JSON-in, JSON-out closure.
fn erase<Req, Rsp, F>(handler: F) -> Box<Invoke>
where
	Req: DeserializeOwned + 'static,
	Rsp: Serialize + 'static,
	F: Fn(Req) -> anyhow::Result<Rsp> + Send + Sync + 'static,
{
	Box::new(move |input| {
		let request = serde_json::from_value(input).map_err(Failure::Bind)?;
		let response = handler(request).map_err(Failure::Handler)?;
		serde_json::to_value(response).map_err(Failure::Encode)
	})
}

/// The bootstrap context of one HTTP service.
pub struct Service {
	config: Config,
	schema: Arc<Schema>,
	routes: RwLock<IndexMap<(Method, String), Arc<Route>>>,
}

impl Default for Service {
	fn default() -> Self {
		Self::new(Config::default())
	}
}

impl Service {
	pub fn new(config: Config) -> Self {
		let schema = Schema {
			registry: RwLock::new(Registry::new(config.registry_options())),
			document: RenderCache::new(),
			options: config.render_options(),
		};
		Self {
			config,
			schema: Arc::new(schema),
			routes: RwLock::new(IndexMap::new()),
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Route group rooted at `base`.
	pub fn group(&self, base: &str) -> RouteGroup<'_> {
		RouteGroup {
			service: self,
			base: join_paths("/", base),
		}
	}

	/// The root route group.
	pub fn root(&self) -> RouteGroup<'_> {
		self.group("")
	}

	/// The IDL document. Rendered on first use and frozen from then on.
	pub fn render(&self) -> &str {
		self.schema.render()
	}

	/// Read access to the schema registry.
	pub fn registry(&self) -> RwLockReadGuard<'_, Registry> {
		self.schema.registry.read()
	}

	/// Registered routes in registration order.
	pub fn routes(&self) -> Vec<Arc<Route>> {
		self.routes.read().values().cloned().collect()
	}

	/// The route registered under exactly this method and path pattern.
	pub fn route(&self, method: Method, path: &str) -> Option<Arc<Route>> {
		self.routes.read().get(&(method, path.to_owned())).cloned()
	}

	/// Finds the first route matching `method` and the concrete `path`, merges
	/// the captured path parameters into `input` and calls it.
	///
	/// An object `input` keeps its own keys; path parameters override them.
	pub fn dispatch(&self, method: Method, path: &str, input: Value) -> Reply {
		let matched = self.routes.read().values().find_map(|route| {
			(route.method == method)
				.then(|| route.match_path(path))
				.flatten()
				.map(|params| (Arc::clone(route), params))
		});
		let Some((route, params)) = matched else {
			trace!(%method, path, "no route");
			return Reply::text(STATUS_NOT_FOUND, "404 page not found");
		};

		let input = match input {
			Value::Object(mut object) => {
				object.extend(params);
				Value::Object(object)
			}
			Value::Null => Value::Object(params),
			other if params.is_empty() => other,
			other => {
				debug!(%method, path, "path parameters dropped for non-object input");
				other
			}
		};
		route.call(input)
	}

	fn insert(
		&self,
		method: Method,
		path: String,
		config: RouteConfig,
		operation: String,
		endpoint: Endpoint,
		register: impl FnOnce(&mut Registry, RouteSpec<'_>) -> protodoc_schema::Result<()>,
	) -> Result<Arc<Route>> {
		if !path.starts_with('/') {
			return Err(RouteError::InvalidPath(path));
		}

		let mut routes = self.routes.write();
		if routes.contains_key(&(method, path.clone())) {
			return Err(RouteError::Conflict { method, path });
		}

		if matches!(endpoint, Endpoint::Typed(_)) && self.schema.document.is_computed() {
			warn!(
				%method,
				path = %path,
				"route registered after the document was rendered; it is missing from it"
			);
		}
		let spec = RouteSpec {
			method: method.as_str(),
			path: &path,
			operation: &operation,
			wrap_response: config.data_wrap,
		};
		let mut registry = self.schema.registry.write();
		if let Err(source) = register(&mut *registry, spec) {
			return Err(RouteError::Schema {
				method,
				path,
				source,
			});
		}
		drop(registry);

		debug!(%method, path = %path, operation = %operation, "registered route");
		let route = Arc::new(Route {
			method,
			path: path.clone(),
			operation,
			config,
			endpoint,
		});
		routes.insert((method, path), Arc::clone(&route));
		Ok(route)
	}
}

/// Operation name of the document route.
const DOC_OPERATION: &str = "serve_doc";

/// A set of routes sharing a base path.
#[derive(Clone)]
pub struct RouteGroup<'s> {
	service: &'s Service,
	base: String,
}

impl<'s> RouteGroup<'s> {
	pub fn base_path(&self) -> &str {
		&self.base
	}

	/// A nested group below this one.
	pub fn group(&self, relative: &str) -> RouteGroup<'s> {
		RouteGroup {
			service: self.service,
			base: join_paths(&self.base, relative),
		}
	}

	/// Registers `handler` under `method` and the joined `path`.
	///
	/// Derives the request and response messages, records the rpc, and adds
	/// the route to the table. Fails without side effects when a type cannot
	/// be expressed.
	pub fn handle<Req, Rsp, F>(
		&self,
		method: Method,
		path: &str,
		handler: F,
		options: &[HandleOption],
	) -> Result<Arc<Route>>
	where
		Req: Reflect + DeserializeOwned,
		Rsp: Reflect + Serialize,
		F: Fn(Req) -> anyhow::Result<Rsp> + Send + Sync + 'static,
	{
		let config = RouteConfig::resolve(&self.service.config, options);
		let path = join_paths(&self.base, path);
		let operation = match config.operation {
			Some(operation) => operation.to_owned(),
			None => match handler_name(&handler) {
				name if is_anonymous(name) => route_operation(method.as_str(), &path),
				name => name.to_owned(),
			},
		};
		self.service.insert(
			method,
			path,
			config,
			operation,
			Endpoint::Typed(erase(handler)),
			|registry, spec| registry.register_route::<Req, Rsp>(spec),
		)
	}

	pub fn get<Req, Rsp, F>(&self, path: &str, handler: F, options: &[HandleOption]) -> Result<Arc<Route>>
	where
		Req: Reflect + DeserializeOwned,
		Rsp: Reflect + Serialize,
		F: Fn(Req) -> anyhow::Result<Rsp> + Send + Sync + 'static,
	{
		self.handle(Method::Get, path, handler, options)
	}

	pub fn post<Req, Rsp, F>(&self, path: &str, handler: F, options: &[HandleOption]) -> Result<Arc<Route>>
	where
		Req: Reflect + DeserializeOwned,
		Rsp: Reflect + Serialize,
		F: Fn(Req) -> anyhow::Result<Rsp> + Send + Sync + 'static,
	{
		self.handle(Method::Post, path, handler, options)
	}

	pub fn put<Req, Rsp, F>(&self, path: &str, handler: F, options: &[HandleOption]) -> Result<Arc<Route>>
	where
		Req: Reflect + DeserializeOwned,
		Rsp: Reflect + Serialize,
		F: Fn(Req) -> anyhow::Result<Rsp> + Send + Sync + 'static,
	{
		self.handle(Method::Put, path, handler, options)
	}

	pub fn patch<Req, Rsp, F>(&self, path: &str, handler: F, options: &[HandleOption]) -> Result<Arc<Route>>
	where
		Req: Reflect + DeserializeOwned,
		Rsp: Reflect + Serialize,
		F: Fn(Req) -> anyhow::Result<Rsp> + Send + Sync + 'static,
	{
		self.handle(Method::Patch, path, handler, options)
	}

	pub fn delete<Req, Rsp, F>(&self, path: &str, handler: F, options: &[HandleOption]) -> Result<Arc<Route>>
	where
		Req: Reflect + DeserializeOwned,
		Rsp: Reflect + Serialize,
		F: Fn(Req) -> anyhow::Result<Rsp> + Send + Sync + 'static,
	{
		self.handle(Method::Delete, path, handler, options)
	}

	/// Installs a GET route answering with the IDL document as text, at
	/// `path` or the configured doc path. Does nothing unless `serve_doc` is
	/// enabled; returns the route when one was installed.
	///
	/// The document route itself is not part of the IDL.
	pub fn serve_doc(&self, path: Option<&str>) -> Result<Option<Arc<Route>>> {
		let config = &self.service.config;
		if !config.serve_doc {
			return Ok(None);
		}
		let path = path.unwrap_or(&config.doc_path);
		let route = self.service.insert(
			Method::Get,
			join_paths(&self.base, path),
			RouteConfig::resolve(config, &[HandleOption::NoDataWrap]),
			DOC_OPERATION.to_owned(),
			Endpoint::Document(Arc::clone(&self.service.schema)),
			|_, _| Ok(()),
		)?;
		Ok(Some(route))
	}
}

/// Joins a relative path onto a base path.
///
/// The result is cleaned (`//`, `.` and `..` resolved) and keeps a trailing
/// slash when `relative` has one. An empty `relative` returns `base` as is.
pub fn join_paths(base: &str, relative: &str) -> String {
	if relative.is_empty() {
		return base.to_owned();
	}
	let parts: Vec<&str> = [base, relative]
		.into_iter()
		.filter(|part| !part.is_empty())
		.collect();
	let mut joined = clean_path(&parts.join("/"));
	if relative.ends_with('/') && !joined.ends_with('/') {
		joined.push('/');
	}
	joined
}

/// Lexical path cleanup: empty and `.` segments dropped, `..` resolved.
fn clean_path(path: &str) -> String {
	let rooted = path.starts_with('/');
	let mut segments: Vec<&str> = Vec::new();
	for segment in path.split('/') {
		match segment {
			"" | "." => {}
			".." => match segments.last() {
				Some(&last) if last != ".." => {
					segments.pop();
				}
				_ if rooted => {}
				_ => segments.push(".."),
			},
			segment => segments.push(segment),
		}
	}

	let body = segments.join("/");
	match (rooted, body.is_empty()) {
		(true, _) => format!("/{body}"),
		(false, true) => ".".to_owned(),
		(false, false) => body,
	}
}

/// Handler of routes that take and return nothing.
pub fn empty_handler(_: Empty) -> anyhow::Result<Empty> {
	Ok(Empty {})
}

#[cfg(test)]
mod tests;
