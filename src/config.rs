use crate::{CowStr, Error, Tags, Value};
use tracing::{debug, trace};

/// A struct whose fields are configuration values.
///
/// This is normally implemented with `#[derive(Config)]`, which lists every field whose type
/// implements [`Value`], in declaration order, with the tags given in `#[confval(...)]`.
///
/// ```
/// # use confval::{Config, Port, NotEmptyStr};
/// #[derive(Config)]
/// struct Server {
///     #[confval(env, flag)]
///     host: NotEmptyStr,
///     #[confval(env = "PORT", flag = "port", usage = "port to listen on")]
///     port: Port,
/// }
/// ```
///
/// It can also be written by hand, e.g. when the field list depends on runtime data.
pub trait Config {
    /// Fields in declaration order, for reading
    fn fields(&self) -> Vec<Field<'_>>;

    /// Fields in declaration order, for setting. Must list the same fields as `fields`.
    fn fields_mut(&mut self) -> Vec<FieldMut<'_>>;
}

/// One field of a [`Config`] struct
pub struct Field<'a> {
    /// Name reported in errors
    pub name: CowStr,
    /// Metadata used by providers
    pub tags: Tags,
    /// The value itself
    pub value: &'a dyn Value,
}

impl<'a> Field<'a> {
    /// Make a field from its parts
    pub fn new(name: impl Into<CowStr>, tags: Tags, value: &'a dyn Value) -> Self {
        Self {
            name: name.into(),
            tags,
            value,
        }
    }
}

/// One field of a [`Config`] struct, which can be set
pub struct FieldMut<'a> {
    /// Name reported in errors
    pub name: CowStr,
    /// Metadata used by providers
    pub tags: Tags,
    /// The value itself
    pub value: &'a mut dyn Value,
}

impl<'a> FieldMut<'a> {
    /// Make a field from its parts
    pub fn new(name: impl Into<CowStr>, tags: Tags, value: &'a mut dyn Value) -> Self {
        Self {
            name: name.into(),
            tags,
            value,
        }
    }
}

/// A source of configuration values, such as the environment or the command line.
pub trait Provider {
    /// Try to set `value`, the field called `name` with the given tags.
    ///
    /// Returns `Ok(true)` if this provider set the value, and `Ok(false)` if it has nothing for
    /// this field, in which case the next provider is asked.
    fn provide(&self, value: &mut dyn Value, name: &str, tags: &Tags) -> Result<bool, Error>;
}

/// Set every field of `cfg` from the first provider, in order, which has something for it.
///
/// Put the highest priority provider first. Fields that no provider sets keep their current
/// value, so defaults can be put in place before calling this.
///
/// Stops at the first provider error, which is returned with the name and tags of the field.
pub fn provide_struct<C: Config + ?Sized>(
    cfg: &mut C,
    providers: &[&dyn Provider],
) -> Result<(), Error> {
    for FieldMut { name, tags, value } in cfg.fields_mut() {
        for (idx, provider) in providers.iter().enumerate() {
            match provider.provide(&mut *value, &name, &tags) {
                Ok(true) => {
                    debug!(field = %name, provider = idx, "field provided");
                    break;
                }
                Ok(false) => {
                    trace!(field = %name, provider = idx, "provider declined");
                }
                Err(err) => {
                    return Err(Error::Field {
                        field: name.into_owned(),
                        tags,
                        source: Box::new(err),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Int, NotEmptyStr, ValueError};
    use assert_matches::assert_matches;
    use std::cell::RefCell;

    struct TwoFields {
        a: Int,
        b: NotEmptyStr,
    }

    impl Config for TwoFields {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new("A", Tags::from_static(&[("key", "a")]), &self.a),
                Field::new("B", Tags::from_static(&[("key", "b")]), &self.b),
            ]
        }

        fn fields_mut(&mut self) -> Vec<FieldMut<'_>> {
            vec![
                FieldMut::new("A", Tags::from_static(&[("key", "a")]), &mut self.a),
                FieldMut::new("B", Tags::from_static(&[("key", "b")]), &mut self.b),
            ]
        }
    }

    // Sets fields from a fixed table and records which fields it was asked about
    struct Table {
        entries: Vec<(&'static str, &'static str)>,
        asked: RefCell<Vec<String>>,
    }

    impl Table {
        fn new(entries: &[(&'static str, &'static str)]) -> Self {
            Self {
                entries: entries.to_vec(),
                asked: Default::default(),
            }
        }
    }

    impl Provider for Table {
        fn provide(&self, value: &mut dyn Value, name: &str, tags: &Tags) -> Result<bool, Error> {
            self.asked.borrow_mut().push(name.to_owned());
            let key = tags.get("key");
            match self.entries.iter().find(|(k, _)| *k == key) {
                Some((_, v)) => {
                    value.set(v)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    fn new_cfg() -> TwoFields {
        TwoFields {
            a: Int::new(),
            b: NotEmptyStr::new(),
        }
    }

    #[test]
    fn test_first_provider_wins() {
        let high = Table::new(&[("a", "1")]);
        let low = Table::new(&[("a", "2"), ("b", "x")]);

        let mut cfg = new_cfg();
        provide_struct(&mut cfg, &[&high, &low]).unwrap();
        assert_eq!(cfg.a.get(), Some(&1));
        assert_eq!(cfg.b.get().map(String::as_str), Some("x"));

        assert_eq!(*high.asked.borrow(), vec!["A", "B"]);
        assert_eq!(*low.asked.borrow(), vec!["B"]);
    }

    #[test]
    fn test_unprovided_keeps_default() {
        let mut cfg = new_cfg();
        cfg.b = NotEmptyStr::must("default");
        provide_struct(&mut cfg, &[&Table::new(&[])]).unwrap();
        assert!(cfg.a.get().is_none());
        assert_eq!(cfg.b.to_string(), "default");

        provide_struct(&mut cfg, &[]).unwrap();
        assert_eq!(cfg.b.to_string(), "default");
    }

    #[test]
    fn test_error_stops_walk() {
        let bad = Table::new(&[("a", "x"), ("b", "y")]);
        let mut cfg = new_cfg();
        let err = provide_struct(&mut cfg, &[&bad]).unwrap_err();
        assert_matches!(&err, Error::Field { field, source, .. } if field == "A" && matches!(**source, Error::Value(ValueError::InvalidInt { .. })));
        assert!(err.to_string().starts_with(r#"A `key:"a"`: invalid integer "x""#));
        assert_eq!(*bad.asked.borrow(), vec!["A"]);
        assert!(cfg.b.get().is_none());
    }

    #[test]
    fn test_fields_read_only() {
        let mut cfg = new_cfg();
        cfg.a.set("7").unwrap();
        let rendered: Vec<String> = cfg
            .fields()
            .iter()
            .map(|f| format!("{}={}", f.name, f.value))
            .collect();
        assert_eq!(rendered, vec!["A=7", "B="]);
    }
}
