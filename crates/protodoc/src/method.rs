//! HTTP methods a route can be bound to.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Request method, displayed and parsed in upper case (`GET`).
#[derive(
	Debug, Display, EnumString, EnumIter, IntoStaticStr, Clone, Copy, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
	Get,
	Post,
	Put,
	Patch,
	Delete,
}

impl Method {
	pub fn as_str(self) -> &'static str {
		self.into()
	}

	/// Whether the request body is bound to the message (every method but GET).
	pub fn has_body(self) -> bool {
		self != Method::Get
	}
}
