use crate::util::*;
use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, Error, Field, Ident, LitStr, Path, Type};

/// `#[confval(...)]` options on one field of a struct with `#[derive(Config)]`
///
/// Every `key = "value"` pair becomes a tag, except `name`, which overrides the reported field
/// name. `env` and `flag` may be given without a value, in which case it is made from the field
/// name. `skip` leaves the field out of the generated `Config` impl.
///
/// A doc comment on the field becomes the `usage` tag, if there isn't one.
pub struct FieldItem {
    field_name: Ident,
    field_type: Type,
    name: Option<LitStr>,
    skip: Option<Ident>,
    tags: Vec<(Ident, LitStr)>,
    doc_string: Option<String>,
}

impl FieldItem {
    /// Parse the options on a field. Returns None for skipped fields.
    pub fn new(field: &Field) -> Result<Option<Self>, Error> {
        let field_name = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "missing identifier"))?;

        let mut result = Self {
            field_name,
            field_type: field.ty.clone(),
            name: None,
            skip: None,
            tags: Vec::new(),
            doc_string: None,
        };
        let unraw_name = result.field_name.unraw().to_string();

        for attr in &field.attrs {
            maybe_append_doc_string(&mut result.doc_string, &attr.meta)?;
            if attr.path().is_ident("confval") {
                attr.parse_nested_meta(|meta| {
                    let path = meta.path.clone();
                    if path.is_ident("skip") {
                        set_once(&path, &mut result.skip, path.get_ident().cloned())
                    } else if path.is_ident("name") {
                        set_once(
                            &path,
                            &mut result.name,
                            Some(parse_required_value::<LitStr>(meta)?),
                        )
                    } else if path.is_ident("env") {
                        let value = parse_optional_value::<LitStr>(meta)?
                            .unwrap_or_else(|| make_env(&unraw_name, path.span()));
                        result.push_tag(&path, value)
                    } else if path.is_ident("flag") {
                        let value = parse_optional_value::<LitStr>(meta)?
                            .unwrap_or_else(|| make_long(&unraw_name, path.span()));
                        result.push_tag(&path, value)
                    } else if path.get_ident().is_some() {
                        let value = parse_optional_value::<LitStr>(meta)?.ok_or_else(|| {
                            Error::new(path.span(), "expected a value, as in `key = \"value\"`")
                        })?;
                        result.push_tag(&path, value)
                    } else {
                        Err(meta.error("expected an identifier"))
                    }
                })?;
            }
        }

        if result.skip.is_some() {
            return Ok(None);
        }

        if let Some(doc_string) = result.doc_string.take() {
            if !result.tags.iter().any(|(key, _)| key == "usage") {
                let usage = Ident::new("usage", Span::call_site());
                let value = LitStr::new(&doc_string, Span::call_site());
                result.tags.push((usage, value));
            }
        }

        Ok(Some(result))
    }

    fn push_tag(&mut self, path: &Path, value: LitStr) -> Result<(), Error> {
        let mut earlier = self
            .tags
            .iter()
            .find(|(key, _)| path.is_ident(key))
            .map(|(key, _)| key.clone());
        let key = path
            .get_ident()
            .cloned()
            .ok_or_else(|| Error::new(path.span(), "expected an identifier"))?;
        set_once(path, &mut earlier, Some(key.clone()))?;
        self.tags.push((key, value));
        Ok(())
    }

    fn reported_name(&self) -> LitStr {
        self.name.clone().unwrap_or_else(|| {
            make_name(&self.field_name.unraw().to_string(), self.field_name.span())
        })
    }

    /// Generate a `confval::Field` (or `FieldMut`) expression for this field
    pub fn gen_field(&self, mutable: bool) -> TokenStream {
        let field_name = &self.field_name;
        let name = self.reported_name();
        let tags = self.tags.iter().map(|(key, value)| {
            let key = LitStr::new(&key.unraw().to_string(), key.span());
            quote! { (#key, #value) }
        });

        // Spanned at the type, so that a field which is not a Value is reported there
        let ty_span = self.field_type.span();
        if mutable {
            let value = quote_spanned! {ty_span=> &mut self.#field_name as &mut dyn ::confval::Value };
            quote! {
                ::confval::FieldMut::new(#name, ::confval::Tags::from_static(&[#(#tags),*]), #value)
            }
        } else {
            let value = quote_spanned! {ty_span=> &self.#field_name as &dyn ::confval::Value };
            quote! {
                ::confval::Field::new(#name, ::confval::Tags::from_static(&[#(#tags),*]), #value)
            }
        }
    }
}
