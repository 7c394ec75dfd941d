//! Append-only layout and service registries.
//!
//! Both collections keep first-registration order (that order is what the
//! renderer emits) and are indexed by key for constant-time dedup.
//! Registering an existing key is a silent no-op.

use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::debug;

use crate::envelope::wrap_layout;
use crate::error::Result;
use crate::layout::StructLayout;
use crate::naming::NamePolicy;
use crate::reflect::{Reflect, TypeIdentity};
use crate::traverse::Traversal;

/// Settings fixed for the lifetime of a [`Registry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryOptions {
	pub name_policy: NamePolicy,
	/// Map `isize`/`usize` to 64-bit IDL integers instead of 32-bit ones.
	pub widen_platform_ints: bool,
}

/// Unique key of a registered operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceEndpoint {
	pub method: String,
	pub path: String,
}

impl ServiceEndpoint {
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			path: path.into(),
		}
	}
}

/// One exposed operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDefinition {
	pub endpoint: ServiceEndpoint,
	/// Canonical operation name, usually the handler's path.
	pub operation: String,
	pub request: Arc<StructLayout>,
	/// The enveloped layout when the route wraps its response.
	pub response: Arc<StructLayout>,
}

/// Everything the registry needs to know about one route.
#[derive(Clone, Copy, Debug)]
pub struct RouteSpec<'a> {
	pub method: &'a str,
	/// Fully joined path.
	pub path: &'a str,
	pub operation: &'a str,
	pub wrap_response: bool,
}

/// Layouts and service definitions collected while routes are registered.
#[derive(Debug, Default)]
pub struct Registry {
	options: RegistryOptions,
	layouts: IndexMap<String, Arc<StructLayout>>,
	services: IndexMap<ServiceEndpoint, ServiceDefinition>,
}

impl Registry {
	pub fn new(options: RegistryOptions) -> Self {
		Self {
			options,
			..Self::default()
		}
	}

	pub fn options(&self) -> RegistryOptions {
		self.options
	}

	/// Display name of a canonical type or handler name under this registry's
	/// naming policy.
	pub fn display_name(&self, canonical: &str) -> String {
		self.options.name_policy.display(canonical)
	}

	pub fn layout(&self, name: &str) -> Option<&Arc<StructLayout>> {
		self.layouts.get(name)
	}

	/// Layouts in registration order.
	pub fn layouts(&self) -> impl ExactSizeIterator<Item = &Arc<StructLayout>> {
		self.layouts.values()
	}

	pub fn service(&self, endpoint: &ServiceEndpoint) -> Option<&ServiceDefinition> {
		self.services.get(endpoint)
	}

	/// Services in registration order.
	pub fn services(&self) -> impl ExactSizeIterator<Item = &ServiceDefinition> {
		self.services.values()
	}

	/// Appends a layout unless one with the same name exists. Returns whether
	/// it was inserted.
	pub fn register_layout(&mut self, layout: Arc<StructLayout>) -> bool {
		self.intern_layout(layout).1
	}

	/// Returns the stored layout for the name, inserting `layout` if absent.
	fn intern_layout(&mut self, layout: Arc<StructLayout>) -> (Arc<StructLayout>, bool) {
		match self.layouts.entry(layout.name.clone()) {
			Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
			Entry::Vacant(entry) => {
				debug!(
					layout = %layout.name,
					fields = layout.fields.len(),
					"registered layout"
				);
				(Arc::clone(entry.insert(layout)), true)
			}
		}
	}

	/// Appends a service unless its endpoint is taken. Returns whether it was
	/// inserted.
	pub fn register_service(
		&mut self,
		endpoint: ServiceEndpoint,
		operation: impl Into<String>,
		request: Arc<StructLayout>,
		response: Arc<StructLayout>,
	) -> bool {
		let Entry::Vacant(entry) = self.services.entry(endpoint) else {
			return false;
		};
		let definition = ServiceDefinition {
			endpoint: entry.key().clone(),
			operation: operation.into(),
			request,
			response,
		};
		debug!(
			method = %definition.endpoint.method,
			path = %definition.endpoint.path,
			operation = %definition.operation,
			"registered service"
		);
		entry.insert(definition);
		true
	}

	/// Resolves `T` as a request or response type. Nested structs are
	/// registered; the returned layout itself is not.
	pub fn resolve<T: Reflect + ?Sized>(&mut self) -> Result<Arc<StructLayout>> {
		let ty = TypeIdentity::of::<T>();
		Traversal::new(self).resolve(ty.name, T::shape())
	}

	/// IDL type expression of `T`, registering any structs it mentions.
	pub fn idl_type<T: Reflect + ?Sized>(&mut self) -> Result<String> {
		Traversal::new(self).idl_type(T::shape())
	}

	/// Registers the layouts and the service definition of one route.
	///
	/// Registration order is request, response, then the response envelope
	/// when `wrap_response` is set. Repeating a route changes nothing. On
	/// error, layouts registered while resolving the route are dropped again.
	pub fn register_route<Req, Rsp>(&mut self, route: RouteSpec<'_>) -> Result<()>
	where
		Req: Reflect + ?Sized,
		Rsp: Reflect + ?Sized,
	{
		let mark = self.layouts.len();
		let (request, response) = match self.resolve_pair::<Req, Rsp>() {
			Ok(pair) => pair,
			Err(err) => {
				self.layouts.truncate(mark);
				return Err(err);
			}
		};

		let (request, _) = self.intern_layout(request);
		let (mut response, _) = self.intern_layout(response);
		if route.wrap_response {
			let wrapped = wrap_layout(&response, self.options.name_policy);
			response = self.intern_layout(Arc::new(wrapped)).0;
		}

		self.register_service(
			ServiceEndpoint::new(route.method, route.path),
			route.operation,
			request,
			response,
		);
		Ok(())
	}

	fn resolve_pair<Req, Rsp>(&mut self) -> Result<(Arc<StructLayout>, Arc<StructLayout>)>
	where
		Req: Reflect + ?Sized,
		Rsp: Reflect + ?Sized,
	{
		Ok((self.resolve::<Req>()?, self.resolve::<Rsp>()?))
	}
}
