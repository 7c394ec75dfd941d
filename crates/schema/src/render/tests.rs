use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::fixtures::{Counted, GreetReq, GreetRsp, Unit};
use crate::registry::RouteSpec;

const GREET_DOCUMENT: &str = r#"syntax = "proto3";

package http_service;

import "google/protobuf/any.proto";

message GreetReq {
  string name = 1;
}

message GreetRsp {
  string greet = 1;
}

message GreetRspWrap {
  int32 code = 1;
  string msg = 2;
  GreetRsp data = 3;
}

service HttpService {
  rpc HandleGreet(GreetReq) returns (GreetRspWrap) {
    option (google.api.http) = {
      get: "/greet/:name"
    };
  }
}
"#;

fn greet_registry() -> Registry {
	let mut registry = Registry::default();
	registry
		.register_route::<GreetReq, GreetRsp>(RouteSpec {
			method: "GET",
			path: "/greet/:name",
			operation: "app::handlers::handle_greet",
			wrap_response: true,
		})
		.unwrap();
	registry
}

#[test]
fn renders_a_complete_document() {
	let text = render(&greet_registry(), &RenderOptions::default());
	assert_eq!(text, GREET_DOCUMENT);
}

#[test]
fn empty_registry_renders_header_and_empty_service() {
	let text = render(&Registry::default(), &RenderOptions::default());
	assert_eq!(
		text,
		"syntax = \"proto3\";\n\npackage http_service;\n\nimport \"google/protobuf/any.proto\";\n\nservice HttpService {\n}\n"
	);
}

#[test]
fn non_get_methods_take_the_whole_body() {
	let mut registry = Registry::default();
	registry
		.register_route::<Counted, Unit>(RouteSpec {
			method: "POST",
			path: "/counter",
			operation: "app::bump",
			wrap_response: false,
		})
		.unwrap();

	let text = render(&registry, &RenderOptions::default());
	assert!(text.contains(
		"  rpc Bump(Counted) returns (Null) {\n    option (google.api.http) = {\n      post: \"/counter\"\n      body: \"*\"\n    };\n  }\n"
	));
	assert!(text.contains("message Null {\n}\n\n"));
}

#[test]
fn service_name_drives_package_and_service_block() {
	let options = RenderOptions {
		service_name: "GreeterAPI".to_owned(),
		..RenderOptions::default()
	};
	let text = render(&greet_registry(), &options);
	assert!(text.contains("package greeter_api;\n"));
	assert!(text.contains("service GreeterApi {\n"));
}

#[rstest]
#[case("/users/:id", PathParams::Colon, "/users/:id")]
#[case("/users/:id", PathParams::Braces, "/users/{id}")]
#[case("/files/*path", PathParams::Braces, "/files/{path=**}")]
#[case("/a/:b/c/:d", PathParams::Braces, "/a/{b}/c/{d}")]
#[case("/static", PathParams::Braces, "/static")]
fn path_parameters(#[case] path: &str, #[case] params: PathParams, #[case] expected: &str) {
	assert_eq!(params.apply(path), expected);
}

#[test]
fn rendering_is_deterministic() {
	let registry = greet_registry();
	let options = RenderOptions::default();
	assert_eq!(render(&registry, &options), render(&registry, &options));
}

#[test]
fn cache_freezes_the_first_rendering() {
	let mut registry = greet_registry();
	let options = RenderOptions::default();
	let cache = RenderCache::new();
	assert!(!cache.is_computed());
	assert_eq!(cache.get(), None);

	let first = cache.get_or_render(&registry, &options).to_owned();
	assert_eq!(first, GREET_DOCUMENT);

	registry
		.register_route::<Counted, Counted>(RouteSpec {
			method: "PUT",
			path: "/late",
			operation: "app::late",
			wrap_response: false,
		})
		.unwrap();

	assert!(cache.is_computed());
	assert_eq!(cache.get_or_render(&registry, &options), first);
	assert!(render(&registry, &options).contains("rpc Late(Counted)"));
}
