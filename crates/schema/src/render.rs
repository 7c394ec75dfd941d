//! IDL rendering.
//!
//! [`IdlDocument`] is a pure view over a [`Registry`]: a header, one
//! `message` block per layout and one `service` block, all in registration
//! order. [`RenderCache`] computes it once and serves that text for the rest
//! of the process.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::layout::StructLayout;
use crate::naming::{package_name, service_name};
use crate::registry::{Registry, ServiceDefinition};

pub const SYNTAX: &str = "proto3";

/// Import backing the dynamic placeholder type.
pub const ANY_IMPORT: &str = "google/protobuf/any.proto";

/// Extension carrying the HTTP binding of an rpc.
pub const HTTP_OPTION: &str = "google.api.http";

pub const DEFAULT_SERVICE_NAME: &str = "http_service";

/// Spelling of path parameters in the HTTP binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathParams {
	/// Paths are emitted as registered (`/users/:id`).
	#[default]
	Colon,
	/// Router parameters are rewritten to template syntax (`/users/{id}`).
	Braces,
}

impl PathParams {
	pub fn apply(self, path: &str) -> String {
		match self {
			PathParams::Colon => path.to_owned(),
			PathParams::Braces => path
				.split('/')
				.map(|segment| {
					if let Some(name) = segment.strip_prefix(':') {
						format!("{{{name}}}")
					} else if let Some(name) = segment.strip_prefix('*') {
						format!("{{{name}=**}}")
					} else {
						segment.to_owned()
					}
				})
				.collect::<Vec<_>>()
				.join("/"),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
	/// Source of the package and service block names.
	pub service_name: String,
	pub path_params: PathParams,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			service_name: DEFAULT_SERVICE_NAME.to_owned(),
			path_params: PathParams::default(),
		}
	}
}

/// The whole document, rendered through [`fmt::Display`].
pub struct IdlDocument<'a> {
	registry: &'a Registry,
	options: &'a RenderOptions,
}

impl<'a> IdlDocument<'a> {
	pub fn new(registry: &'a Registry, options: &'a RenderOptions) -> Self {
		Self { registry, options }
	}

	fn write_message(&self, f: &mut fmt::Formatter<'_>, layout: &StructLayout) -> fmt::Result {
		writeln!(f, "message {} {{", self.registry.display_name(&layout.name))?;
		for (index, field) in layout.fields.iter().enumerate() {
			writeln!(f, "  {} {} = {};", field.form, field.name, index + 1)?;
		}
		f.write_str("}\n\n")
	}

	fn write_rpc(&self, f: &mut fmt::Formatter<'_>, service: &ServiceDefinition) -> fmt::Result {
		let registry = self.registry;
		let endpoint = &service.endpoint;
		writeln!(
			f,
			"  rpc {}({}) returns ({}) {{",
			registry.display_name(&service.operation),
			registry.display_name(&service.request.name),
			registry.display_name(&service.response.name),
		)?;
		writeln!(f, "    option ({HTTP_OPTION}) = {{")?;
		writeln!(
			f,
			"      {}: \"{}\"",
			endpoint.method.to_lowercase(),
			self.options.path_params.apply(&endpoint.path),
		)?;
		if !endpoint.method.eq_ignore_ascii_case("GET") {
			writeln!(f, "      body: \"*\"")?;
		}
		f.write_str("    };\n  }\n")
	}
}

impl fmt::Display for IdlDocument<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "syntax = \"{SYNTAX}\";\n")?;
		writeln!(f, "package {};\n", package_name(&self.options.service_name))?;
		writeln!(f, "import \"{ANY_IMPORT}\";\n")?;

		for layout in self.registry.layouts() {
			self.write_message(f, layout)?;
		}

		writeln!(f, "service {} {{", service_name(&self.options.service_name))?;
		for service in self.registry.services() {
			self.write_rpc(f, service)?;
		}
		f.write_str("}\n")
	}
}

/// Renders the current registry contents.
pub fn render(registry: &Registry, options: &RenderOptions) -> String {
	IdlDocument::new(registry, options).to_string()
}

/// Compute-once holder for the rendered document.
///
/// The first request renders; every later request returns that text, even if
/// the registry has grown since.
#[derive(Debug, Default)]
pub struct RenderCache {
	text: OnceLock<String>,
}

impl RenderCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get_or_render(&self, registry: &Registry, options: &RenderOptions) -> &str {
		self.text.get_or_init(|| render(registry, options))
	}

	/// The rendered text, if it has been computed.
	pub fn get(&self) -> Option<&str> {
		self.text.get().map(String::as_str)
	}

	pub fn is_computed(&self) -> bool {
		self.text.get().is_some()
	}
}

#[cfg(test)]
mod tests;
