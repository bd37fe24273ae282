//! Locating `compound_config` from generated code.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

const CONFIG: &str = "compound_config";
const UMBRELLA: &str = "compound";

/// Path to `compound_config` as seen from the crate being expanded.
///
/// A direct dependency wins, under whatever name the consumer gave it.
/// Otherwise the path goes through the `compound` umbrella crate. When
/// neither is declared the bare name is emitted, and the compiler points at
/// the missing dependency.
pub(crate) fn config_crate() -> TokenStream {
    if let Some(name) = dependency_name(CONFIG) {
        let name = Ident::new(&name, Span::call_site());
        return quote!(#name);
    }

    let config = Ident::new(CONFIG, Span::call_site());
    match crate_name(UMBRELLA) {
        Ok(FoundCrate::Name(umbrella)) => {
            let umbrella = Ident::new(&umbrella, Span::call_site());
            quote!(#umbrella::#config)
        }
        _ => quote!(#config),
    }
}

fn dependency_name(package: &str) -> Option<String> {
    match crate_name(package).ok()? {
        FoundCrate::Itself => Some(package.to_owned()),
        FoundCrate::Name(name) => Some(name),
    }
}
