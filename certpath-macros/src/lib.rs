//! Procedural macros used in the definition and implementation of getters and setters for
//! CertificationPathSettings and CertificationPathResults

use proc_macro2::Span;
use quote::quote;
use syn::parse::ParseStream;
use syn::parse::{Parse, Result};
use syn::{Expr, Ident, Token};

type ValueName = Ident;
type ValueType = Ident;
type DefaultValue = Expr;

/// Signature contains the results of parsing a cpr_gets_and_sets definition, i.e., the
/// name of a value stored in a map and the corresponding type. For example:
///     ```text
///     cpr_gets_and_sets!(PR_FAILED_CERTIFICATE_INDEX, usize);
///     ```
struct Signature {
    value_name: ValueName,
    value_type: ValueType,
}

impl Parse for Signature {
    fn parse(stream: ParseStream<'_>) -> Result<Self> {
        let value_name = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type = stream.parse()?;
        Ok(Signature {
            value_name,
            value_type,
        })
    }
}

/// SignatureWithDefault contains the results of parsing a cps_gets_and_sets_with_default definition,
/// i.e., the name of a value stored in a map, the corresponding type and the default value. For example:
///     ```text
///     cps_gets_and_sets_with_default!(PS_ENFORCE_BASIC_CONSTRAINTS, bool, true);
///     ```
struct SignatureWithDefault {
    value_name: ValueName,
    value_type: ValueType,
    default_value: DefaultValue,
}

impl Parse for SignatureWithDefault {
    fn parse(stream: ParseStream<'_>) -> Result<Self> {
        let value_name = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type = stream.parse()?;
        let _comma2: Token!(,) = stream.parse()?;
        let default_value = stream.parse()?;
        Ok(SignatureWithDefault {
            value_name,
            value_type,
            default_value,
        })
    }
}

/// Names derived from a PS_ or PR_ item name and a value type.
struct Accessors {
    getter: Ident,
    setter: Ident,
    variant: Ident,
    getter_comment: String,
    setter_comment: String,
}

/// `variant_for_type` maps a value type to the name of the enum variant that carries it, i.e., `u64`
/// to `U64`, `bool` to `Bool` and `usize` to `Usize`. Types that are already capitalized are unchanged.
fn variant_for_type(value_type: &Ident) -> String {
    let type_str = value_type.to_string();
    let mut chars = type_str.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => type_str,
    }
}

fn accessors(value_name: &Ident, value_type: &Ident, container: &str) -> Accessors {
    let name_str = value_name.to_string();
    // skip the PS_ or PR_ prefix
    let flag_str = name_str.get(3..).unwrap_or(&name_str).to_lowercase();
    let getter_str = format!("get_{}", flag_str);
    let setter_str = format!("set_{}", flag_str);

    Accessors {
        getter: Ident::new(&getter_str, value_name.span()),
        setter: Ident::new(&setter_str, value_name.span()),
        variant: Ident::new(&variant_for_type(value_type), Span::call_site()),
        getter_comment: format!(
            "`{}` is used to retrieve `{}` items from a [`{}`] instance",
            getter_str, name_str, container
        ),
        setter_comment: format!(
            "`{}` is used to set `{}` items in a [`{}`] instance",
            setter_str, name_str, container
        ),
    }
}

/// Generates a getter that falls back to a default value and a setter for a CertificationPathSettings item.
#[proc_macro]
pub fn cps_gets_and_sets_with_default(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as SignatureWithDefault);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let default_value = signature.default_value;
    let Accessors {
        getter,
        setter,
        variant,
        getter_comment,
        setter_comment,
    } = accessors(&flag, &return_t, "CertificationPathSettings");

    let tokens = quote! {
        impl CertificationPathSettings {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> #return_t {
                match self.0.get(#flag) {
                    Some(CertificationPathProcessingTypes::#variant(v)) => v.clone(),
                    _ => #default_value,
                }
            }
            #[doc = #setter_comment]
            pub fn #setter(&mut self, v: #return_t) {
                self.0.insert(
                    #flag.to_string(),
                    CertificationPathProcessingTypes::#variant(v),
                );
            }
        }
    };
    tokens.into()
}

/// Generates an `Option` returning getter and a setter for a CertificationPathResults item.
#[proc_macro]
pub fn cpr_gets_and_sets(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as Signature);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let Accessors {
        getter,
        setter,
        variant,
        getter_comment,
        setter_comment,
    } = accessors(&flag, &return_t, "CertificationPathResults");

    let tokens = quote! {
        impl CertificationPathResults {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> Option<#return_t> {
                match self.0.get(#flag) {
                    Some(CertificationPathResultsTypes::#variant(v)) => Some(v.clone()),
                    _ => None,
                }
            }
            #[doc = #setter_comment]
            pub fn #setter(&mut self, v: #return_t) {
                self.0.insert(#flag, CertificationPathResultsTypes::#variant(v));
            }
        }
    };
    tokens.into()
}
