//! Derive macro for the `Configurable` trait.

use crate::crate_path::config_crate;
use darling::util::Flag;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Meta, parse_macro_input};

/// Parsed struct-level attributes.
#[derive(FromDeriveInput)]
#[darling(attributes(config))]
struct ConfigurableArgs {
    ident: syn::Ident,
    generics: syn::Generics,

    /// Document path shared by every field without its own.
    path: Option<String>,
}

/// Parsed field-level attributes.
#[derive(FromField)]
#[darling(attributes(config))]
struct FieldArgs {
    ident: Option<syn::Ident>,
    ty: syn::Type,

    key: Option<String>,
    path: Option<String>,
    required: Option<bool>,
    colorize: Flag,
    resolver: Option<syn::Path>,
    nested: Flag,
    extends: Flag,
}

impl FieldArgs {
    /// Arguments for a bare `#[config]` attribute.
    fn bare(field: &syn::Field) -> Self {
        Self {
            ident: field.ident.clone(),
            ty: field.ty.clone(),
            key: None,
            path: None,
            required: None,
            colorize: Flag::default(),
            resolver: None,
            nested: Flag::default(),
            extends: Flag::default(),
        }
    }

    /// Parses the `#[config]` attributes of `field`, if it has any.
    fn parse(field: &syn::Field) -> darling::Result<Option<Self>> {
        let attrs: Vec<_> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("config"))
            .collect();

        if attrs.is_empty() {
            return Ok(None);
        }
        if attrs.iter().all(|attr| matches!(attr.meta, Meta::Path(_))) {
            return Ok(Some(Self::bare(field)));
        }
        Self::from_field(field).map(Some)
    }

    /// Rejects option combinations that have no meaning.
    fn validate(&self) -> darling::Result<()> {
        let mut errors = darling::Error::accumulator();

        if self.nested.is_present() && self.extends.is_present() {
            errors.push(
                darling::Error::custom("`nested` and `extends` are mutually exclusive")
                    .with_span(&self.ty),
            );
        }

        if self.nested.is_present() || self.extends.is_present() {
            let kind = if self.nested.is_present() {
                "nested"
            } else {
                "extends"
            };
            let extras = [
                ("path", self.path.is_some()),
                ("required", self.required.is_some()),
                ("colorize", self.colorize.is_present()),
                ("resolver", self.resolver.is_some()),
            ];
            for (option, present) in extras {
                if present {
                    errors.push(
                        darling::Error::custom(format!(
                            "`{option}` cannot be combined with `{kind}`"
                        ))
                        .with_span(&self.ty),
                    );
                }
            }
        }

        if self.extends.is_present() && self.key.is_some() {
            errors.push(
                darling::Error::custom("`key` cannot be combined with `extends`")
                    .with_span(&self.ty),
            );
        }

        errors.finish()
    }
}

/// Implementation of the `#[derive(Configurable)]` macro.
pub(crate) fn derive_configurable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let args = ConfigurableArgs::from_derive_input(input)?;

    let fields: Vec<&syn::Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(darling::Error::custom(
                    "`Configurable` can only be derived for structs with named fields",
                )
                .with_span(&input.ident));
            }
        },
        _ => {
            return Err(darling::Error::custom(
                "`Configurable` can only be derived for structs",
            )
            .with_span(&input.ident));
        }
    };

    let cfg_crate = config_crate();

    let mut errors = darling::Error::accumulator();
    let mut steps = Vec::new();
    for field in fields {
        let Some(field_args) = errors.handle(FieldArgs::parse(field)).flatten() else {
            continue;
        };
        if errors.handle(field_args.validate()).is_none() {
            continue;
        }
        steps.push(schema_step(&cfg_crate, &field_args));
    }
    errors.finish()?;

    let name = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();
    let path = args.path.as_ref().map(|path| quote!(.path(#path)));

    Ok(quote! {
        impl #impl_generics #cfg_crate::schema::Configurable for #name #ty_generics #where_clause {
            fn schema() -> #cfg_crate::schema::ConfigSchema<Self> {
                #cfg_crate::schema::ConfigSchema::<Self>::new()
                    #path
                    #(#steps)*
            }
        }
    })
}

/// Generates the schema builder call for one field.
fn schema_step(cfg_crate: &TokenStream2, field: &FieldArgs) -> TokenStream2 {
    // Named fields always carry an ident.
    let Some(ident) = field.ident.as_ref() else {
        return TokenStream2::new();
    };
    let ty = &field.ty;
    let name = ident.to_string();

    if field.extends.is_present() {
        return quote! {
            .extends::<#ty>(|this| &mut this.#ident)
        };
    }

    if field.nested.is_present() {
        let key = field.key.clone().unwrap_or(name);
        return quote! {
            .nested::<#ty>(#key, |this| &mut this.#ident)
        };
    }

    let binding = match &field.resolver {
        Some(resolver) => quote! {
            #cfg_crate::schema::FieldBinding::<Self>::resolved::<#ty>(
                #name,
                |this| &mut this.#ident,
                #cfg_crate::resolver::ResolverSpec::of::<#resolver>(),
            )
        },
        None => quote! {
            #cfg_crate::schema::FieldBinding::<Self>::new::<#ty>(#name, |this| &mut this.#ident)
        },
    };

    let key = field.key.as_ref().map(|key| quote!(.key(#key)));
    let path = field.path.as_ref().map(|path| quote!(.path(#path)));
    let required = field.required.map(|required| quote!(.required(#required)));
    let colorize = field.colorize.is_present().then(|| quote!(.colorize(true)));

    quote! {
        .field(#binding #key #path #required #colorize)
    }
}
