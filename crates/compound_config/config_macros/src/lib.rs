//! Procedural macros for `compound_config`.
//!
//! This crate provides `#[derive(Configurable)]`, which generates a binding
//! schema from field attributes.

mod configurable;
mod crate_path;

use proc_macro::TokenStream;

/// Derive macro for the `Configurable` trait.
///
/// Only fields carrying a `#[config]` attribute are bound; the rest are left
/// untouched by the binder.
///
/// # Struct attributes
///
/// - `path`: Document path used by every field without its own path.
///
/// # Field attributes
///
/// - `key`: Dotted key in the document. Defaults to the field name.
/// - `path`: Document path for this field alone.
/// - `required`: Whether a missing value fails the bind. Defaults to `true`.
/// - `colorize`: Translate color codes in string values.
/// - `resolver`: A `Resolver + Default` type producing the field's value.
/// - `nested`: Bind the field's own schema under `key` as a sub-section.
/// - `extends`: Bind the field's own schema as an ancestor of this type.
///
/// # Example
///
/// ```ignore
/// use compound_config::prelude::*;
///
/// #[derive(Default, Configurable)]
/// #[config(path = "chat.json")]
/// struct Chat {
///     #[config(key = "messages.welcome", colorize)]
///     welcome: String,
///     #[config(required = false)]
///     cooldown: u32,
///     #[config(nested, key = "limits")]
///     limits: Limits,
///     not_configured: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    configurable::derive_configurable(input)
}
