use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::*;
use crate::error::ApiError;
use crate::reply::Envelope;
use crate::{Message, SchemaError};

#[derive(Debug, Deserialize, Message)]
pub struct GreetReq {
	#[message(uri = "name")]
	pub name: String,
	#[serde(default)]
	#[message(form = "times")]
	pub times: u32,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize, Message)]
pub struct GreetRsp {
	pub greet: String,
}

#[derive(Deserialize, Message)]
pub struct Deep {
	pub rows: Vec<Vec<i32>>,
}

fn handle_greet(req: GreetReq) -> anyhow::Result<GreetRsp> {
	if req.name == "nobody" {
		return Err(ApiError::new(1001, "unknown user {}")
			.with_status(404)
			.extend([&req.name])
			.into());
	}
	let times = req.times.max(1) as usize;
	Ok(GreetRsp {
		greet: format!("hello {}!", req.name).repeat(times),
	})
}

#[rstest]
#[case("/", "/greet", "/greet")]
#[case("/api/v1", "/greet/:name", "/api/v1/greet/:name")]
#[case("/api/v1", "greet", "/api/v1/greet")]
#[case("/api", "", "/api")]
#[case("/api", "users/", "/api/users/")]
#[case("/api/", "/", "/api/")]
#[case("/a//b", "./c", "/a/b/c")]
#[case("/a/b", "../c", "/a/c")]
#[case("/", "../../x", "/x")]
#[case("", "x", "x")]
fn joins_like_gin(#[case] base: &str, #[case] relative: &str, #[case] expected: &str) {
	assert_eq!(join_paths(base, relative), expected);
}

#[test]
fn groups_nest() {
	let service = Service::default();
	let group = service.group("/api").group("v1/");
	assert_eq!(group.base_path(), "/api/v1/");
	assert_eq!(service.root().base_path(), "/");
}

#[test]
fn registers_route_and_schema() {
	let service = Service::default();
	let route = service
		.group("/api/v1")
		.get("/greet/:name", handle_greet, &[])
		.unwrap();

	assert_eq!(route.method(), Method::Get);
	assert_eq!(route.path(), "/api/v1/greet/:name");
	assert!(route.operation().ends_with("handle_greet"));
	assert!(route.is_documented());

	let registry = service.registry();
	let names: Vec<_> = registry
		.layouts()
		.map(|l| registry.display_name(&l.name))
		.collect();
	assert_eq!(names, ["GreetReq", "GreetRsp", "GreetRspWrap"]);
	let request = registry.layouts().next().unwrap();
	let fields: Vec<_> = request.fields.iter().map(|f| f.name.as_str()).collect();
	assert_eq!(fields, ["name", "times"]);
}

#[test]
fn calls_the_handler_with_wrapped_reply() {
	let service = Service::default();
	let route = service
		.root()
		.get("/greet/:name", handle_greet, &[])
		.unwrap();

	let reply = route.call(json!({ "name": "bob", "times": 2 }));
	assert_eq!(reply.status, 200);
	let envelope: Envelope<GreetRsp> = reply.decode().unwrap();
	assert_eq!(
		envelope,
		Envelope::ok(GreetRsp {
			greet: "hello bob!hello bob!".to_owned(),
		})
	);
}

#[test]
fn no_data_wrap_replies_with_the_payload() {
	let service = Service::default();
	let route = service
		.root()
		.get("/greet/:name", handle_greet, &[HandleOption::NoDataWrap])
		.unwrap();

	let reply = route.call(json!({ "name": "amy" }));
	assert_eq!(reply, Reply::json(200, json!({ "greet": "hello amy!" })));
	// The rpc answers with the bare message.
	assert!(service
		.render()
		.contains("returns (GreetRsp) {"));
}

#[test]
fn binding_and_handler_failures() {
	let service = Service::default();
	let route = service
		.root()
		.post("/greet", handle_greet, &[])
		.unwrap();

	let reply = route.call(json!({ "times": 1 }));
	assert_eq!(reply.status, 400);
	assert_eq!(reply.as_json().unwrap()["code"], 1);

	let reply = route.call(json!({ "name": "nobody" }));
	assert_eq!(
		reply,
		Reply::json(404, json!({ "code": 1001, "msg": "unknown user nobody" }))
	);
}

#[test]
fn null_input_binds_empty_requests() {
	let service = Service::default();
	let route = service.root().get("/ping", empty_handler, &[]).unwrap();
	let reply = route.call(Value::Null);
	assert_eq!(reply, Reply::json(200, json!({ "code": 0, "msg": "", "data": {} })));
	assert!(service.render().contains("rpc EmptyHandler(Null) returns (NullWrap)"));
}

#[test]
fn dispatch_merges_path_parameters() {
	let service = Service::default();
	service
		.group("/api")
		.get("/greet/:name", handle_greet, &[HandleOption::NoDataWrap])
		.unwrap();

	let reply = service.dispatch(Method::Get, "/api/greet/eve", json!({ "name": "ignored" }));
	assert_eq!(reply.decode::<GreetRsp>().unwrap().greet, "hello eve!");

	let reply = service.dispatch(Method::Get, "/api/greet/eve", Value::Null);
	assert!(reply.is_success());

	assert_eq!(service.dispatch(Method::Post, "/api/greet/eve", Value::Null).status, 404);
	assert_eq!(service.dispatch(Method::Get, "/api/greet", Value::Null).status, 404);
	assert_eq!(service.dispatch(Method::Get, "/api/greet/eve/x", Value::Null).status, 404);
}

#[test]
fn wildcard_captures_the_rest() {
	let service = Service::default();
	let route = service
		.root()
		.get("/files/*path", empty_handler, &[])
		.unwrap();
	let params = route.match_path("/files/a/b.txt").unwrap();
	assert_eq!(params["path"], "/a/b.txt");
	assert!(route.match_path("/other/a").is_none());
}

#[test]
fn conflicting_routes_are_rejected() {
	let service = Service::default();
	let group = service.root();
	group.get("/greet/:name", handle_greet, &[]).unwrap();
	let err = group.get("/greet/:name", handle_greet, &[]).unwrap_err();
	assert!(matches!(err, RouteError::Conflict { method: Method::Get, .. }));
	// Same path, other method is fine.
	group.delete("/greet/:name", handle_greet, &[]).unwrap();
	assert_eq!(service.routes().len(), 2);
	assert_eq!(service.registry().services().len(), 2);
}

#[test]
fn relative_root_paths_are_rejected() {
	let service = Service::default();
	let group = RouteGroup {
		service: &service,
		base: String::new(),
	};
	let err = group.get("greet", handle_greet, &[]).unwrap_err();
	assert!(matches!(err, RouteError::InvalidPath(path) if path == "greet"));
}

#[test]
fn unsupported_types_fail_registration() {
	let service = Service::default();
	let err = service
		.root()
		.put("/deep", |_: Deep| Ok(Empty {}), &[])
		.unwrap_err();
	let RouteError::Schema { method, path, source } = &err else {
		panic!("expected a schema error, got {err}");
	};
	assert_eq!((*method, path.as_str()), (Method::Put, "/deep"));
	assert!(matches!(source, SchemaError::NestedRepeated { .. }));
	assert!(service.routes().is_empty());
	assert_eq!(service.registry().services().len(), 0);
}

#[test]
fn operation_can_be_overridden() {
	let service = Service::default();
	service
		.root()
		.patch("/greet", handle_greet, &[HandleOption::Operation("SayHello")])
		.unwrap();
	let document = service.render();
	assert!(document.contains("rpc SayHello(GreetReq) returns (GreetRspWrap)"));
	assert!(document.contains("      patch: \"/greet\"\n      body: \"*\"\n"));
}

#[test]
fn closures_are_named_after_their_route() {
	let service = Service::default();
	let api = service.group("/api");
	let first = api.get("/a", |_: Empty| Ok(Empty {}), &[]).unwrap();
	api.post("/b/:id", |_: Empty| Ok(Empty {}), &[]).unwrap();
	assert_eq!(first.operation(), "get_api_a");

	let document = service.render();
	assert!(document.contains("rpc GetApiA(Null) returns (NullWrap)"));
	assert!(document.contains("rpc PostApiBId(Null) returns (NullWrap)"));
	assert!(!document.contains("rpc Closure("));
}

#[test]
fn failed_route_leaves_no_messages() {
	#[derive(Deserialize, Message)]
	pub struct Part {
		pub label: String,
	}

	#[derive(Deserialize, Message)]
	pub struct Oversized {
		pub part: Part,
		pub total: u128,
	}

	let service = Service::default();
	service
		.root()
		.post("/oversized", |_: Oversized| Ok(Empty {}), &[])
		.unwrap_err();
	assert_eq!(service.registry().layouts().len(), 0);
	assert!(!service.render().contains("message Part"));
}

#[test]
fn document_is_frozen_after_first_render() {
	let service = Service::default();
	service.root().get("/one", empty_handler, &[]).unwrap();
	let first = service.render().to_owned();

	service.root().get("/two", handle_greet, &[]).unwrap();
	assert_eq!(service.render(), first);
	assert!(!first.contains("/two"));
	// The registry itself keeps growing.
	assert_eq!(service.registry().services().len(), 2);
}

#[test]
fn serve_doc_is_off_by_default() {
	let service = Service::default();
	assert!(service.root().serve_doc(None).unwrap().is_none());
	assert!(service.routes().is_empty());
}

#[test]
fn serve_doc_installs_an_undocumented_text_route() {
	let service = Service::new(Config::default().with_serve_doc(true));
	service.root().get("/greet/:name", handle_greet, &[]).unwrap();
	let doc = service.root().serve_doc(None).unwrap().unwrap();

	assert_eq!(doc.path(), "/doc/pb");
	assert!(!doc.is_documented());
	assert_eq!(service.registry().services().len(), 1);

	let reply = service.dispatch(Method::Get, "/doc/pb", Value::Null);
	assert_eq!(reply.status, 200);
	let text = reply.as_text().unwrap();
	assert_eq!(text, service.render());
	assert!(!text.contains("doc/pb"));
}

#[test]
fn serve_doc_honours_group_and_custom_path() {
	let service = Service::new(
		Config::default()
			.with_serve_doc(true)
			.with_doc_path("/idl"),
	);
	let doc = service.group("/api").serve_doc(None).unwrap().unwrap();
	assert_eq!(doc.path(), "/api/idl");
	let doc = service.root().serve_doc(Some("/proto")).unwrap().unwrap();
	assert_eq!(doc.path(), "/proto");
}
