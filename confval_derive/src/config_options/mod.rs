//! GenConfigStruct parses the syn data for a struct with `#[derive(Config)]`, and generates the
//! Config trait implementation.
//!
//! The per-field `#[confval(...)]` options are parsed by FieldItem.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Attribute, Error, FieldsNamed, Generics, Ident};

mod field_item;
use field_item::FieldItem;

/// Helper which generates the `impl Config` block for a struct.
///
/// Calling "new" parses all the proc macro attributes on the fields.
pub struct GenConfigStruct {
    ident: Ident,
    fields: Vec<FieldItem>,
}

impl GenConfigStruct {
    /// Parse syn data for a struct with derive(Config) on it
    pub fn new(ident: &Ident, attrs: &[Attribute], fields: &FieldsNamed) -> Result<Self, Error> {
        if let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("confval")) {
            return Err(Error::new(
                attr.span(),
                "confval options are only supported on fields",
            ));
        }

        let fields = fields
            .named
            .iter()
            .map(FieldItem::new)
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            ident: ident.clone(),
            fields: fields.into_iter().flatten().collect(),
        })
    }

    /// Generate an impl Config block for this struct
    ///
    /// Takes generics associated to the struct.
    pub fn gen_config_impl(&self, generics: &Generics) -> Result<TokenStream, Error> {
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        let ident = &self.ident;

        let fields = self
            .fields
            .iter()
            .map(|field| field.gen_field(false))
            .collect::<Vec<_>>();
        let fields_mut = self
            .fields
            .iter()
            .map(|field| field.gen_field(true))
            .collect::<Vec<_>>();

        Ok(quote! {
            #[automatically_derived]
            #[allow(
                unused_qualifications,
            )]
            impl #impl_generics ::confval::Config for #ident #ty_generics #where_clause {
                fn fields(&self) -> ::std::vec::Vec<::confval::Field<'_>> {
                    ::std::vec![#(#fields),*]
                }

                fn fields_mut(&mut self) -> ::std::vec::Vec<::confval::FieldMut<'_>> {
                    ::std::vec![#(#fields_mut),*]
                }
            }
        })
    }
}
