//! Procedural macros for protodoc.
//!
//! Provides `#[derive(Message)]`, which implements `Reflect` for a struct so
//! the schema registry can lay it out as an IDL message.

use proc_macro::TokenStream;

/// Message derive implementation.
mod message;

/// Implements `Reflect` for a struct with named fields (or a unit struct).
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Message)]
/// #[serde(rename_all = "camelCase")]
/// pub struct ListUsersReq {
///     #[message(uri = "team")]
///     pub team_id: u64,
///     pub page_size: u32,
///     #[serde(flatten)]
///     pub paging: Paging,
///     #[serde(skip)]
///     pub trace: Option<String>,
///     cursor: String,
/// }
/// ```
///
/// # Field names
///
/// The `json` tag is taken from serde: `rename`, then the container's
/// `rename_all`; `skip`/`skip_serializing` remove the field. A field without
/// any of these carries no `json` tag and lower-priority tags apply.
///
/// # Attributes
///
/// Container:
/// * `#[message(crate = "path")]` - path of the runtime crate (default `::protodoc`)
///
/// Field:
/// * `json = "name"`, `form = "name"`, `uri = "name"`, `header = "name"` - explicit tags
/// * `embed` - flatten the field's message into this one (same as `#[serde(flatten)]`)
/// * `skip` - leave the field out of the message
///
/// Only `pub` fields are part of the message.
#[proc_macro_derive(Message, attributes(message, serde))]
pub fn derive_message(input: TokenStream) -> TokenStream {
	message::derive_message(input)
}
