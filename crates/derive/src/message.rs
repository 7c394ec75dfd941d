//! `#[derive(Message)]` implementation.

use heck::{
	ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
	ToUpperCamelCase,
};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
	Attribute, Data, DeriveInput, Expr, Fields, GenericParam, LitStr, Path, Token, Visibility,
	parse_macro_input, parse_quote,
};

const SKIP_MARKER: &str = "-";

pub fn derive_message(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	expand(input)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
	let Data::Struct(data) = &input.data else {
		return Err(syn::Error::new_spanned(
			&input.ident,
			"Message can only be derived for structs",
		));
	};
	if let Some(lifetime) = input.generics.lifetimes().next() {
		return Err(syn::Error::new_spanned(
			lifetime,
			"Message types cannot borrow; remove the lifetime parameter",
		));
	}

	let container = ContainerAttrs::parse(&input.attrs)?;
	let krate = &container.krate;

	let fields = match &data.fields {
		Fields::Named(named) => named
			.named
			.iter()
			.map(|field| field_descriptor(field, &container))
			.collect::<syn::Result<Vec<_>>>()?,
		Fields::Unit => Vec::new(),
		Fields::Unnamed(unnamed) => {
			return Err(syn::Error::new_spanned(
				unnamed,
				"Message requires named fields",
			));
		}
	};

	for param in &mut input.generics.params {
		if let GenericParam::Type(param) = param {
			param.bounds.push(parse_quote!(#krate::reflect::Reflect));
		}
	}

	let name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	Ok(quote! {
		impl #impl_generics #krate::reflect::Reflect for #name #ty_generics #where_clause {
			fn shape() -> #krate::reflect::Shape {
				#krate::reflect::Shape::Struct(#krate::reflect::StructShape::new::<Self>(
					::std::vec![#(#fields),*],
				))
			}
		}
	})
}

struct ContainerAttrs {
	krate: Path,
	rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
	fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
		let mut krate: Path = parse_quote!(::protodoc);
		let mut rename_all = None;

		for attr in attrs {
			if attr.path().is_ident("message") {
				attr.parse_nested_meta(|meta| {
					if meta.path.is_ident("crate") {
						let value: LitStr = meta.value()?.parse()?;
						krate = value.parse()?;
						Ok(())
					} else {
						Err(meta.error("unknown message container attribute"))
					}
				})?;
			} else if attr.path().is_ident("serde") {
				attr.parse_nested_meta(|meta| {
					if meta.path.is_ident("rename_all") {
						if meta.input.peek(Token![=]) {
							let value: LitStr = meta.value()?.parse()?;
							rename_all = Some(RenameRule::parse(&value)?);
						} else {
							// `rename_all(serialize = "..", deserialize = "..")`
							meta.parse_nested_meta(|inner| {
								if inner.path.is_ident("serialize") {
									let value: LitStr = inner.value()?.parse()?;
									rename_all = Some(RenameRule::parse(&value)?);
									Ok(())
								} else {
									ignore(inner)
								}
							})?;
						}
						Ok(())
					} else {
						ignore(meta)
					}
				})?;
			}
		}

		Ok(Self { krate, rename_all })
	}
}

/// Tag-relevant settings of one field.
#[derive(Default)]
struct FieldAttrs {
	json: Option<String>,
	form: Option<String>,
	uri: Option<String>,
	header: Option<String>,
	serde_rename: Option<String>,
	serde_skip: bool,
	embed: bool,
	skip: bool,
}

impl FieldAttrs {
	fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
		let mut out = Self::default();
		for attr in attrs {
			if attr.path().is_ident("message") {
				attr.parse_nested_meta(|meta| {
					let slot = if meta.path.is_ident("json") {
						&mut out.json
					} else if meta.path.is_ident("form") {
						&mut out.form
					} else if meta.path.is_ident("uri") {
						&mut out.uri
					} else if meta.path.is_ident("header") {
						&mut out.header
					} else if meta.path.is_ident("embed") {
						out.embed = true;
						return Ok(());
					} else if meta.path.is_ident("skip") {
						out.skip = true;
						return Ok(());
					} else {
						return Err(meta.error("unknown message field attribute"));
					};
					let value: LitStr = meta.value()?.parse()?;
					*slot = Some(value.value());
					Ok(())
				})?;
			} else if attr.path().is_ident("serde") {
				attr.parse_nested_meta(|meta| {
					if meta.path.is_ident("rename") {
						if meta.input.peek(Token![=]) {
							let value: LitStr = meta.value()?.parse()?;
							out.serde_rename = Some(value.value());
						} else {
							meta.parse_nested_meta(|inner| {
								if inner.path.is_ident("serialize") {
									let value: LitStr = inner.value()?.parse()?;
									out.serde_rename = Some(value.value());
									Ok(())
								} else {
									ignore(inner)
								}
							})?;
						}
						Ok(())
					} else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
						out.serde_skip = true;
						Ok(())
					} else if meta.path.is_ident("flatten") {
						out.embed = true;
						Ok(())
					} else {
						ignore(meta)
					}
				})?;
			}
		}
		Ok(out)
	}

	fn json_tag(&self, ident: &str, rename_all: Option<RenameRule>) -> Option<String> {
		if let Some(json) = &self.json {
			return Some(json.clone());
		}
		if self.serde_skip {
			return Some(SKIP_MARKER.to_owned());
		}
		if let Some(rename) = &self.serde_rename {
			return Some(rename.clone());
		}
		rename_all.map(|rule| rule.apply(ident))
	}
}

/// Consumes an attribute argument this macro has no use for.
fn ignore(meta: ParseNestedMeta) -> syn::Result<()> {
	if meta.input.peek(Token![=]) {
		meta.value()?.parse::<Expr>()?;
	} else if meta.input.peek(syn::token::Paren) {
		meta.parse_nested_meta(ignore)?;
	}
	Ok(())
}

fn field_descriptor(field: &syn::Field, container: &ContainerAttrs) -> syn::Result<TokenStream2> {
	let krate = &container.krate;
	let attrs = FieldAttrs::parse(&field.attrs)?;
	let Some(ident) = &field.ident else {
		return Err(syn::Error::new_spanned(field, "Message requires named fields"));
	};
	let ident = ident.unraw().to_string();
	let ty = &field.ty;

	let exported = matches!(field.vis, Visibility::Public(_)) && !attrs.skip;
	let embedded = attrs.embed;

	let tags = [
		("json", attrs.json_tag(&ident, container.rename_all)),
		("form", attrs.form.clone()),
		("uri", attrs.uri.clone()),
		("header", attrs.header.clone()),
	]
	.into_iter()
	.filter_map(|(namespace, value)| value.map(|value| quote!(.tag(#namespace, #value))));

	Ok(quote! {
		#krate::reflect::Field::of::<#ty>(#ident)
			.exported(#exported)
			.embedded(#embedded)
			#(#tags)*
	})
}

/// serde's `rename_all` conventions.
#[derive(Clone, Copy)]
enum RenameRule {
	Lower,
	Upper,
	Pascal,
	Camel,
	Snake,
	ScreamingSnake,
	Kebab,
	ScreamingKebab,
}

impl RenameRule {
	fn parse(lit: &LitStr) -> syn::Result<Self> {
		Ok(match lit.value().as_str() {
			"lowercase" => Self::Lower,
			"UPPERCASE" => Self::Upper,
			"PascalCase" => Self::Pascal,
			"camelCase" => Self::Camel,
			"snake_case" => Self::Snake,
			"SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
			"kebab-case" => Self::Kebab,
			"SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
			other => {
				return Err(syn::Error::new_spanned(
					lit,
					format!("unknown rename_all rule `{other}`"),
				));
			}
		})
	}

	fn apply(self, ident: &str) -> String {
		match self {
			Self::Lower => ident.to_lowercase(),
			Self::Upper => ident.to_uppercase(),
			Self::Pascal => ident.to_upper_camel_case(),
			Self::Camel => ident.to_lower_camel_case(),
			Self::Snake => ident.to_snake_case(),
			Self::ScreamingSnake => ident.to_shouty_snake_case(),
			Self::Kebab => ident.to_kebab_case(),
			Self::ScreamingKebab => ident.to_shouty_kebab_case(),
		}
	}
}
