//! Per-route handling options.

use crate::config::Config;

/// Overrides a route's reply behaviour relative to the service [`Config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleOption {
	/// Wrap successful responses as `{code: 0, msg: "", data}`.
	DataWrap,
	/// Reply with the bare response payload.
	NoDataWrap,
	/// Reply with status 200 whatever the outcome.
	StatusCodeAlwaysOk,
	/// Operation name used in the IDL instead of the handler's own name.
	Operation(&'static str),
}

/// Effective settings of one route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteConfig {
	pub data_wrap: bool,
	pub always_ok: bool,
	pub invalid_argument_code: i32,
	pub internal_server_error_code: i32,
	pub operation: Option<&'static str>,
}

impl RouteConfig {
	/// Applies `options` in order over the service defaults; later options win.
	pub fn resolve(config: &Config, options: &[HandleOption]) -> Self {
		let mut out = Self {
			data_wrap: config.data_wrap,
			always_ok: config.always_ok,
			invalid_argument_code: config.invalid_argument_code,
			internal_server_error_code: config.internal_server_error_code,
			operation: None,
		};
		for option in options {
			match *option {
				HandleOption::DataWrap => out.data_wrap = true,
				HandleOption::NoDataWrap => out.data_wrap = false,
				HandleOption::StatusCodeAlwaysOk => out.always_ok = true,
				HandleOption::Operation(name) => out.operation = Some(name),
			}
		}
		out
	}
}
