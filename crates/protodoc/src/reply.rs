//! Replies produced by route handlers.
//!
//! Status rules, where "always ok" forces 200 in every case:
//!
//! | outcome                  | status             | body                                   |
//! |--------------------------|--------------------|----------------------------------------|
//! | request failed to bind   | 400                | `{code: invalid_argument_code, msg}`   |
//! | handler [`ApiError`]     | its status, or 500 | `{code, msg}`                          |
//! | any other handler error  | 500                | `{code: internal_server_error_code, msg}` |
//! | success, data-wrap       | 200                | `{code: 0, msg: "", data}`             |
//! | success, no data-wrap    | 200                | the payload                            |

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::options::RouteConfig;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_SERVER_ERROR: u16 = 500;

/// Body of a wrapped reply; mirrors the `...Wrap` message of the IDL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
	pub code: i32,
	pub msg: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
}

impl<T> Envelope<T> {
	pub fn ok(data: T) -> Self {
		Self {
			code: 0,
			msg: String::new(),
			data: Some(data),
		}
	}

	pub fn error(code: i32, msg: impl Into<String>) -> Self {
		Self {
			code,
			msg: msg.into(),
			data: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReplyBody {
	Json(Value),
	Text(String),
}

/// Status and body of one handled request.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
	pub status: u16,
	pub body: ReplyBody,
}

impl Reply {
	pub fn json(status: u16, body: Value) -> Self {
		Self {
			status,
			body: ReplyBody::Json(body),
		}
	}

	pub fn text(status: u16, body: impl Into<String>) -> Self {
		Self {
			status,
			body: ReplyBody::Text(body.into()),
		}
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	pub fn as_json(&self) -> Option<&Value> {
		match &self.body {
			ReplyBody::Json(value) => Some(value),
			ReplyBody::Text(_) => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match &self.body {
			ReplyBody::Text(text) => Some(text),
			ReplyBody::Json(_) => None,
		}
	}

	/// Decodes a JSON body.
	pub fn decode<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
		match &self.body {
			ReplyBody::Json(value) => T::deserialize(value),
			ReplyBody::Text(text) => serde_json::from_str(text),
		}
	}
}

/// Why a typed handler produced no payload.
#[derive(Debug)]
pub(crate) enum Failure {
	/// The input did not deserialize into the request type.
	Bind(serde_json::Error),
	Handler(anyhow::Error),
	/// The response did not serialize.
	Encode(serde_json::Error),
}

impl RouteConfig {
	fn status(&self, status: u16) -> u16 {
		if self.always_ok { STATUS_OK } else { status }
	}

	fn error_body(code: i32, msg: String) -> Value {
		json!({ "code": code, "msg": msg })
	}

	pub(crate) fn success(&self, payload: Value) -> Reply {
		let body = if self.data_wrap {
			json!({ "code": 0, "msg": "", "data": payload })
		} else {
			payload
		};
		Reply::json(STATUS_OK, body)
	}

	pub(crate) fn failure(&self, failure: &Failure) -> Reply {
		match failure {
			Failure::Bind(err) => Reply::json(
				self.status(STATUS_BAD_REQUEST),
				Self::error_body(self.invalid_argument_code, err.to_string()),
			),
			Failure::Handler(err) => match err.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
				Some(api) => Reply::json(
					self.status(api.status().unwrap_or(STATUS_INTERNAL_SERVER_ERROR)),
					Self::error_body(api.code, api.msg.clone()),
				),
				None => Reply::json(
					self.status(STATUS_INTERNAL_SERVER_ERROR),
					Self::error_body(self.internal_server_error_code, format!("{err:#}")),
				),
			},
			Failure::Encode(err) => Reply::json(
				self.status(STATUS_INTERNAL_SERVER_ERROR),
				Self::error_body(self.internal_server_error_code, err.to_string()),
			),
		}
	}
}
