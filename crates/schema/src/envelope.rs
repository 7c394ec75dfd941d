//! Response envelope layouts.

use crate::layout::{FieldMeta, StructLayout};
use crate::naming::NamePolicy;
use crate::reflect::TypeIdentity;

/// Appended to the wrapped layout's name.
pub const ENVELOPE_SUFFIX: &str = "Wrap";

/// Field names of the envelope, in emission order.
pub const CODE_FIELD: &str = "code";
pub const MSG_FIELD: &str = "msg";
pub const DATA_FIELD: &str = "data";

/// Wraps a bare response layout as `{code, msg, data}`.
///
/// `data` references the bare layout by display name, so the bare layout has
/// to be registered as well. The input is left untouched.
pub fn wrap_layout(layout: &StructLayout, policy: NamePolicy) -> StructLayout {
	StructLayout {
		ty: layout.ty,
		name: format!("{}{ENVELOPE_SUFFIX}", layout.name),
		fields: vec![
			FieldMeta {
				ty: TypeIdentity::of::<i32>(),
				ident: "Code",
				name: CODE_FIELD.to_owned(),
				form: "int32".to_owned(),
			},
			FieldMeta {
				ty: TypeIdentity::of::<String>(),
				ident: "Msg",
				name: MSG_FIELD.to_owned(),
				form: "string".to_owned(),
			},
			FieldMeta {
				ty: layout.ty,
				ident: "Data",
				name: DATA_FIELD.to_owned(),
				form: policy.display(&layout.name),
			},
		],
	}
}
