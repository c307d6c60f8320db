//! Procedural macros for mintshop-store

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Ident};

/// Container-level options for #[derive(Mutation)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(mutation), supports(enum_any))]
struct MutationOpts {
    ident: Ident,
    data: darling::ast::Data<MutationVariant, ()>,
}

/// Variant-level attributes for #[derive(Mutation)]
#[derive(Debug, FromVariant)]
#[darling(attributes(mutation))]
struct MutationVariant {
    ident: Ident,

    /// Explicit name override
    #[darling(default)]
    name: Option<String>,
}

/// Container-level options for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: Ident,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes for #[derive(Action)]
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: Ident,

    /// Explicit name override
    #[darling(default)]
    name: Option<String>,
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Generate `name()` for `trait_path` plus an inherent `NAMES` table.
fn expand_names(
    name: &Ident,
    variants: Vec<(&Ident, String)>,
    trait_path: TokenStream2,
    kind: &str,
) -> TokenStream2 {
    let name_arms = variants.iter().map(|(variant, variant_str)| {
        quote! { #name::#variant { .. } => #variant_str }
    });
    let names = variants.iter().map(|(_, variant_str)| variant_str);
    let doc = format!("Every {} name of [`{}`], in declaration order.", kind, name);

    quote! {
        impl #trait_path for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }

        impl #name {
            #[doc = #doc]
            pub const NAMES: &'static [&'static str] = &[#(#names),*];
        }
    }
}

/// Derive macro for the Mutation trait
///
/// Generates a `name()` method returning the snake_case variant name (or the
/// `#[mutation(name = "...")]` override) and a `NAMES` constant listing every
/// mutation name of the closed set.
///
/// # Example
/// ```ignore
/// #[derive(Mutation, Clone, Debug)]
/// enum AppMutation {
///     ReceiveShops(Vec<Shop>),
///     #[mutation(name = "clear_cart")]
///     EmptyCart,
/// }
///
/// assert_eq!(AppMutation::EmptyCart.name(), "clear_cart");
/// assert_eq!(AppMutation::NAMES, &["receive_shops", "clear_cart"]);
/// ```
#[proc_macro_derive(Mutation, attributes(mutation))]
pub fn derive_mutation(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match MutationOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Mutation can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let named = variants
        .iter()
        .map(|v| {
            let name = v
                .name
                .clone()
                .unwrap_or_else(|| to_snake_case(&v.ident.to_string()));
            (&v.ident, name)
        })
        .collect();

    expand_names(
        &opts.ident,
        named,
        quote! { mintshop_store::Mutation },
        "mutation",
    )
    .into()
}

/// Derive macro for the Action trait
///
/// Same shape as `#[derive(Mutation)]`: snake_case `name()` with an optional
/// `#[action(name = "...")]` override, and a `NAMES` constant.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     GetShops,
///     SearchShops { keyword: String },
/// }
///
/// assert_eq!(AppAction::GetShops.name(), "get_shops");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let named = variants
        .iter()
        .map(|v| {
            let name = v
                .name
                .clone()
                .unwrap_or_else(|| to_snake_case(&v.ident.to_string()));
            (&v.ident, name)
        })
        .collect();

    expand_names(
        &opts.ident,
        named,
        quote! { mintshop_store::Action },
        "action",
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("ReceiveAddress"), "receive_address");
        assert_eq!(to_snake_case("ClearCart"), "clear_cart");
        assert_eq!(to_snake_case("GetShopInfo"), "get_shop_info");
        assert_eq!(to_snake_case("Logout"), "logout");
    }
}
