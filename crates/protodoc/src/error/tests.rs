use rstest::rstest;

use super::*;

#[rstest]
#[case(0, None)]
#[case(100, None)]
#[case(101, Some(101))]
#[case(404, Some(404))]
#[case(599, Some(599))]
#[case(600, None)]
fn status_must_be_in_range(#[case] status: u16, #[case] expected: Option<u16>) {
	assert_eq!(ApiError::new(1, "x").with_status(status).status(), expected);
}

#[test]
fn serializes_code_and_message_only() {
	let err = ApiError::new(1001, "invalid handle option").with_status(403);
	assert_eq!(
		serde_json::to_value(&err).unwrap(),
		serde_json::json!({ "code": 1001, "msg": "invalid handle option" })
	);
	assert_eq!(err.to_string(), "invalid handle option");
}

#[rstest]
#[case("user {} not found", &["bob"], "user bob not found")]
#[case("{} of {}", &["1", "2"], "1 of 2")]
#[case("{} of {}", &["1"], "1 of {}")]
#[case("no placeholders", &["ignored"], "no placeholders")]
#[case("{}{}", &["a", "b"], "ab")]
fn extend_fills_placeholders(#[case] template: &str, #[case] values: &[&str], #[case] expected: &str) {
	let err = ApiError::new(7, template).extend(values);
	assert_eq!(err.msg, expected);
	assert_eq!(err.code, 7);
}

#[test]
fn extend_keeps_code_and_status() {
	let base = ApiError::new(3, "quota {} exceeded").with_status(429);
	let err = base.extend([42]);
	assert_eq!(err, ApiError::new(3, "quota 42 exceeded").with_status(429));
	assert_eq!(base.msg, "quota {} exceeded");
}

#[test]
fn route_errors_name_the_route() {
	let err = RouteError::Schema {
		method: Method::Post,
		path: "/items".to_owned(),
		source: SchemaError::InvalidMapKey {
			key: "repeated int32".to_owned(),
		},
	};
	assert_eq!(
		err.to_string(),
		"POST /items: map key must be a scalar type, got `repeated int32`"
	);
}
