//! Display names for types, handlers and services.

use heck::{ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// How the module path of a type or handler survives into its display name.
///
/// Chosen once when a [`Registry`](crate::Registry) is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
	/// Keep only the last path segment of every path (`api::v1::User` -> `User`).
	#[default]
	Short,
	/// Keep the whole path with separators normalized (`api::v1::User` -> `api_v1_User`).
	Qualified,
}

impl NamePolicy {
	/// Applies the policy to a canonical name without case conversion.
	pub fn trim(self, name: &str) -> String {
		let name = name.replace("{{closure}}", "closure");
		match self {
			NamePolicy::Short => strip_paths(&name),
			NamePolicy::Qualified => name.replace("::", "_"),
		}
	}

	/// Display name: trimmed, sanitized to an identifier, then UpperCamelCase.
	pub fn display(self, name: &str) -> String {
		sanitize(&self.trim(name)).to_upper_camel_case()
	}
}

/// Removes every `segment::` prefix, including those inside generic arguments.
fn strip_paths(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	let mut segment = String::new();
	let mut chars = name.chars().peekable();

	while let Some(c) = chars.next() {
		if c.is_alphanumeric() || c == '_' {
			segment.push(c);
			continue;
		}
		if c == ':' && chars.peek() == Some(&':') {
			chars.next();
			segment.clear();
			continue;
		}
		out.push_str(&segment);
		segment.clear();
		out.push(c);
	}
	out.push_str(&segment);
	out
}

fn sanitize(name: &str) -> String {
	name.chars()
		.map(|c| if c.is_alphanumeric() { c } else { '_' })
		.collect()
}

/// Canonical name of a handler, as reported by the compiler.
pub fn handler_name<F>(_: &F) -> &'static str {
	std::any::type_name::<F>()
}

/// Whether a handler name has no identifier of its own, as with closures.
pub fn is_anonymous(handler: &str) -> bool {
	handler.ends_with("{{closure}}")
}

/// Operation name built from a route, for handlers that cannot name it:
/// the lowercase method followed by the path segments, parameter sigils
/// dropped (`GET /users/:id` -> `get_users_id`).
pub fn route_operation(method: &str, path: &str) -> String {
	let mut name = method.to_ascii_lowercase();
	for segment in path.split('/') {
		let segment = segment.trim_start_matches([':', '*']);
		if !segment.is_empty() {
			name.push('_');
			name.push_str(segment);
		}
	}
	name
}

/// IDL package name for a service.
pub fn package_name(service: &str) -> String {
	service.to_snake_case()
}

/// IDL service block name.
pub fn service_name(service: &str) -> String {
	service.to_upper_camel_case()
}
