use crate::{Config, Error, FlagRegistry};

/// Add the field name, flag and tags to a "value required" error.
///
/// Typed reads only know the value that was unset. This finds the field holding that value
/// in `cfgs`, and the flag registered for it in `flags`, and returns an error like
/// `Port (--port env:"PORT"): value required`. Any other error is returned as it is.
///
/// # Panics
///
/// If the error is about a value which is not a field of any of `cfgs`.
#[track_caller]
pub fn wrap_err(err: Error, flags: Option<&dyn FlagRegistry>, cfgs: &[&dyn Config]) -> Error {
    let Some(required) = err.required().copied() else {
        return err;
    };
    let id = required.id();

    let flag = flags
        .and_then(|registry| {
            registry
                .visit_all()
                .into_iter()
                .filter(|(_, flag_id)| *flag_id == id)
                .last()
                .map(|(name, _)| format!("{}{name}", registry.flag_prefix()))
        })
        .unwrap_or_default();

    let found = cfgs
        .iter()
        .flat_map(|cfg| cfg.fields())
        .filter(|field| field.value.id() == id)
        .last();
    let Some(field) = found else {
        panic!("required value not found in given configs");
    };

    let tags = field.tags.to_string();
    let context = [flag.as_str(), tags.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Error::RequiredField {
        field: field.name.into_owned(),
        context,
        source: required,
    }
}
