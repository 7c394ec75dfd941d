//! Error types for configuration, route registration and handlers.

use std::fmt::Display;
use std::path::PathBuf;

use protodoc_schema::SchemaError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::method::Method;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or an unexpected value.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Errors raised while registering a route.
#[derive(Debug, Error)]
pub enum RouteError {
	/// The request or response type cannot be expressed as a message.
	#[error("{method} {path}: {source}")]
	Schema {
		method: Method,
		path: String,
		#[source]
		source: SchemaError,
	},

	#[error("route path must begin with '/': {0:?}")]
	InvalidPath(String),

	/// The method and path are already bound to a handler.
	#[error("{method} {path} is already registered")]
	Conflict { method: Method, path: String },
}

/// Result type for route registration.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Structured error returned by handlers.
///
/// Serialized as `{code, msg}`. The optional HTTP status is not part of the
/// body and is only kept when it lies strictly between 100 and 600.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{msg}")]
pub struct ApiError {
	pub code: i32,
	pub msg: String,
	#[serde(skip)]
	status: Option<u16>,
}

impl ApiError {
	pub fn new(code: i32, msg: impl Into<String>) -> Self {
		Self {
			code,
			msg: msg.into(),
			status: None,
		}
	}

	/// Sets the HTTP status of replies carrying this error. Out-of-range
	/// statuses are ignored.
	pub fn with_status(mut self, status: u16) -> Self {
		if status > 100 && status < 600 {
			self.status = Some(status);
		}
		self
	}

	pub fn status(&self) -> Option<u16> {
		self.status
	}

	/// Derives a new error whose message has each `{}` replaced by the next
	/// value. Placeholders without a value are left as they are.
	///
	/// ```
	/// # use protodoc::ApiError;
	/// let not_found = ApiError::new(404, "user {} not found").with_status(404);
	/// let err = not_found.extend(["bob"]);
	/// assert_eq!(err.msg, "user bob not found");
	/// assert_eq!(err.status(), Some(404));
	/// ```
	pub fn extend<I>(&self, values: I) -> Self
	where
		I: IntoIterator,
		I::Item: Display,
	{
		let mut values = values.into_iter();
		let mut msg = String::with_capacity(self.msg.len());
		let mut rest = self.msg.as_str();
		while let Some(at) = rest.find("{}") {
			msg.push_str(&rest[..at]);
			match values.next() {
				Some(value) => msg.push_str(&value.to_string()),
				None => msg.push_str("{}"),
			}
			rest = &rest[at + 2..];
		}
		msg.push_str(rest);

		Self {
			code: self.code,
			msg,
			status: self.status,
		}
	}
}

#[cfg(test)]
mod tests;
