//! Hand-written descriptors shared by the unit tests.

use std::collections::HashMap;

use crate::reflect::{Field, Reflect, Shape, StructShape};

macro_rules! message {
	($($ty:ident { $($field:expr),* $(,)? })*) => {
		$(
			pub struct $ty;

			impl Reflect for $ty {
				fn shape() -> Shape {
					Shape::Struct(StructShape::new::<Self>(vec![$($field),*]))
				}
			}
		)*
	};
}

message! {
	GreetReq {
		Field::of::<String>("Name").tag("uri", "name"),
	}

	GreetRsp {
		Field::of::<String>("Greet").tag("json", "greet"),
	}

	Counted {
		Field::of::<String>("Greet").tag("json", "greet"),
		Field::of::<i32>("Count").tag("json", "count"),
	}

	Unit {}

	Node {
		Field::of::<i64>("Value").tag("json", "value"),
		Field::of::<Vec<Node>>("Children").tag("json", "children"),
	}

	LinkedA {
		Field::of::<Option<Box<LinkedB>>>("Next").tag("json", "next"),
	}

	LinkedB {
		Field::of::<Vec<LinkedA>>("Back").tag("json", "back"),
	}

	Base {
		Field::of::<u64>("Id").tag("json", "id"),
		Field::of::<String>("secret").exported(false),
	}

	WithEmbed {
		Field::of::<String>("Title").tag("json", "title"),
		Field::of::<Option<Box<Base>>>("Base").embedded(true),
		Field::of::<bool>("Done").tag("json", "done"),
	}

	EmbedsScalar {
		Field::of::<i32>("Level").embedded(true),
		Field::of::<bool>("Done"),
	}

	SelfEmbed {
		Field::of::<u8>("Depth"),
		Field::of::<Option<Box<SelfEmbed>>>("Inner").embedded(true),
	}

	Tagged {
		Field::of::<String>("A").tag("form", "a_form").tag("json", "-"),
		Field::of::<String>("B").tag("form", "-").tag("json", "bee"),
		Field::of::<String>("C").tag("uri", "cee").tag("form", "sea"),
		Field::of::<String>("D").tag("json", ",omitempty"),
		Field::of::<String>("E").tag("json", "e,omitempty"),
		Field::of::<String>("F").tag("header", "X-F"),
	}

	Collections {
		Field::of::<Vec<HashMap<String, i32>>>("ListOfMaps").tag("json", "list_of_maps"),
		Field::of::<HashMap<String, HashMap<String, i32>>>("MapOfMaps").tag("json", "map_of_maps"),
		Field::of::<Vec<u8>>("Bytes").tag("json", "bytes"),
		Field::of::<HashMap<u32, Option<GreetRsp>>>("Nested").tag("json", "nested"),
	}

	NestedVec {
		Field::of::<Vec<Vec<i32>>>("Rows"),
	}

	MapOfVec {
		Field::of::<HashMap<String, Vec<i32>>>("Values"),
	}

	Huge {
		Field::of::<i128>("Value"),
	}

	PartlyHuge {
		Field::of::<GreetRsp>("Inner").tag("json", "inner"),
		Field::of::<i128>("Big").tag("json", "big"),
	}

	SelfList {
		Field::of::<Vec<SelfList>>("Kids").tag("json", "kids"),
	}

	EmbedsSelfList {
		Field::of::<String>("Title").tag("json", "title"),
		Field::of::<SelfList>("List").embedded(true),
	}

	Duplicated {
		Field::of::<String>("First").tag("json", "x"),
		Field::of::<i32>("Second").tag("json", "x"),
	}

	HoldsUnit {
		Field::of::<Unit>("Nothing").tag("json", "nothing"),
		Field::of::<()>("AlsoNothing").tag("json", "also_nothing"),
	}
}
