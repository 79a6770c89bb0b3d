use heck::{ToKebabCase, ToShoutySnakeCase, ToUpperCamelCase};
use proc_macro2::Span;
use syn::{
    meta::ParseNestedMeta, parse::Parse, spanned::Spanned, Error, Expr, ExprLit, Lit, LitStr,
    Meta, Path, Token,
};

/// Helper for reading a required value, which comes after a key, during `.parse_nested_meta`
pub fn parse_required_value<T: Parse>(meta: ParseNestedMeta<'_>) -> Result<T, Error> {
    let t: T = meta.value()?.parse()?;
    Ok(t)
}

/// Helper for reading an optional value, which may come after a key, during `.parse_nested_meta`
pub fn parse_optional_value<T: Parse>(meta: ParseNestedMeta<'_>) -> Result<Option<T>, Error> {
    if meta.input.is_empty() || meta.input.peek(Token![,]) {
        Ok(None)
    } else {
        Ok(Some(parse_required_value::<T>(meta)?))
    }
}

/// Helper for making a default flag name for a field
pub fn make_long(field_name: &str, span: Span) -> LitStr {
    LitStr::new(&field_name.to_kebab_case(), span)
}

/// Helper for making a default env variable name for a field
pub fn make_env(field_name: &str, span: Span) -> LitStr {
    LitStr::new(&field_name.to_shouty_snake_case(), span)
}

/// Helper for making the default reported name for a field
pub fn make_name(field_name: &str, span: Span) -> LitStr {
    LitStr::new(&field_name.to_upper_camel_case(), span)
}

/// An internal version of Spanned with a blanket implementation, this lets us put it on our custom types more easily.
pub trait GetSpan {
    fn get_span(&self) -> Span;
}

impl<T: Spanned> GetSpan for T {
    fn get_span(&self) -> Span {
        self.span()
    }
}

/// Helper for setting a parameter that should only be set once, during `.parse_nested_meta`
pub fn set_once<T: GetSpan>(
    context: &Path,
    param: &mut Option<T>,
    val: Option<T>,
) -> Result<(), Error> {
    if let Some(param) = param.as_ref() {
        let name = context
            .get_ident()
            .map(ToString::to_string)
            .unwrap_or_default();
        let mut error = Error::new(context.span(), format!("{name} cannot be specified twice"));
        error.combine(Error::new(param.get_span(), "Earlier specified here"));
        return Err(error);
    }
    *param = val;
    Ok(())
}

/// Helper for appending a doc string attribute to the description string, if it is a doc string attribute.
///
/// Lines are trimmed and joined with spaces, since the result is used as a one-line tag value.
pub fn maybe_append_doc_string(
    description: &mut Option<String>,
    attr_meta: &Meta,
) -> Result<(), Error> {
    let doc_expr = match attr_meta {
        Meta::NameValue(ref name_value) if name_value.path.is_ident("doc") => &name_value.value,
        _ => return Ok(()),
    };

    let lit = match doc_expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => s.value(),
        other => {
            return Err(Error::new(
                other.span(),
                "Doc comment is not a string literal",
            ))
        }
    };

    let trimmed = lit
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if trimmed.is_empty() {
        return Ok(());
    }

    if let Some(desc) = description.as_mut() {
        desc.push(' ');
        desc.push_str(&trimmed);
    } else {
        *description = Some(trimmed);
    }
    Ok(())
}
