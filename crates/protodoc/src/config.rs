//! Service configuration.
//!
//! Every key has a default, so an empty document is a valid configuration:
//!
//! ```toml
//! service_name = "user_service"
//! serve_doc = true
//! doc_path = "/doc/pb"
//! name_policy = "qualified"     # or "short"
//! widen_platform_ints = false
//! path_params = "braces"        # or "colon"
//! data_wrap = true
//! always_ok = false
//! invalid_argument_code = 1
//! internal_server_error_code = 2
//! ```
//!
//! `name_policy` and `widen_platform_ints` shape every derived message and
//! are read once, when the [`Service`](crate::Service) is created.

use std::path::Path;

use protodoc_schema::render::DEFAULT_SERVICE_NAME;
use protodoc_schema::{NamePolicy, PathParams, RegistryOptions, RenderOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_DOC_PATH: &str = "/doc/pb";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Source of the IDL package and service names.
	pub service_name: String,
	/// Whether [`RouteGroup::serve_doc`](crate::RouteGroup::serve_doc) installs
	/// the document route.
	pub serve_doc: bool,
	pub doc_path: String,
	pub name_policy: NamePolicy,
	pub widen_platform_ints: bool,
	pub path_params: PathParams,
	/// Default for wrapping successful responses as `{code, msg, data}`.
	pub data_wrap: bool,
	/// Default for answering every request with status 200.
	pub always_ok: bool,
	/// Envelope code for requests that fail to bind.
	pub invalid_argument_code: i32,
	/// Envelope code for handler failures that are not an
	/// [`ApiError`](crate::ApiError).
	pub internal_server_error_code: i32,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			service_name: DEFAULT_SERVICE_NAME.to_owned(),
			serve_doc: false,
			doc_path: DEFAULT_DOC_PATH.to_owned(),
			name_policy: NamePolicy::default(),
			widen_platform_ints: false,
			path_params: PathParams::default(),
			data_wrap: true,
			always_ok: false,
			invalid_argument_code: 1,
			internal_server_error_code: 2,
		}
	}
}

impl Config {
	/// Parse a TOML string into a [`Config`].
	pub fn parse(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
		self.service_name = name.into();
		self
	}

	/// Enables the document route under `path`.
	pub fn with_serve_doc(mut self, enable: bool) -> Self {
		self.serve_doc = enable;
		self
	}

	pub fn with_doc_path(mut self, path: impl Into<String>) -> Self {
		self.doc_path = path.into();
		self
	}

	pub fn with_name_policy(mut self, policy: NamePolicy) -> Self {
		self.name_policy = policy;
		self
	}

	pub fn with_widen_platform_ints(mut self, widen: bool) -> Self {
		self.widen_platform_ints = widen;
		self
	}

	pub fn with_path_params(mut self, params: PathParams) -> Self {
		self.path_params = params;
		self
	}

	pub fn with_data_wrap(mut self, wrap: bool) -> Self {
		self.data_wrap = wrap;
		self
	}

	pub fn with_always_ok(mut self, always_ok: bool) -> Self {
		self.always_ok = always_ok;
		self
	}

	pub fn with_invalid_argument_code(mut self, code: i32) -> Self {
		self.invalid_argument_code = code;
		self
	}

	pub fn with_internal_server_error_code(mut self, code: i32) -> Self {
		self.internal_server_error_code = code;
		self
	}

	pub(crate) fn registry_options(&self) -> RegistryOptions {
		RegistryOptions {
			name_policy: self.name_policy,
			widen_platform_ints: self.widen_platform_ints,
		}
	}

	pub(crate) fn render_options(&self) -> RenderOptions {
		RenderOptions {
			service_name: self.service_name.clone(),
			path_params: self.path_params,
		}
	}
}
