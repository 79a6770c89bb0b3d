use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream;
use syn::{parse_macro_input, DeriveInput};
use syn::{Data, DataStruct, Error, Fields};

mod config_options;
use config_options::GenConfigStruct;

pub(crate) mod util;

/// Derive a `Config` implementation for a struct whose fields are configuration values,
/// with `#[confval(...)]` attributes on the fields.
#[proc_macro_derive(Config, attributes(confval))]
pub fn config(input: TokenStream1) -> TokenStream1 {
    let input: DeriveInput = parse_macro_input!(input);
    derive_config(&input)
        .unwrap_or_else(|error| error.to_compile_error())
        .into()
}

fn derive_config(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let ident = &input.ident;

    match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => {
            let gen = GenConfigStruct::new(ident, &input.attrs, fields)?;
            gen.gen_config_impl(&input.generics)
        }

        _ => Err(Error::new(
            ident.span(),
            "#[derive(Config)] is only supported on structs with named fields",
        )),
    }
}
