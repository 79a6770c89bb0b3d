use crate::kind::{self, Kind, HostPortTuple};
use crate::{Error, RequiredError, SliceValue, Value, ValueError, ValueId};
use core::any::Any;
use std::cell::Cell;
use std::fmt;

/// A sequence of configuration values of some [`Kind`], which may be unset.
///
/// With `SPLIT` (the default) each `set` call parses a comma-separated list, otherwise the whole
/// string is one element.
///
/// Repeated `set` calls append, so a flag given several times collects all of its occurrences.
/// Once the sequence has been read (with `get`, `value` or `Value::get_any`) it is "completed",
/// and the next `set` replaces it instead. This is what keeps values from a lower priority source
/// from being joined with values from a higher priority one.
///
/// Setting the empty string on an unset sequence makes it an empty sequence, which is distinct
/// from unset. (Except for kinds where the empty string is a valid element.)
pub struct Slice<K: Kind, const SPLIT: bool = true> {
    kind: K,
    values: Option<Vec<K::Output>>,
    // Accepted input for each element, parallel to `values`
    raw: Vec<String>,
    completed: Cell<bool>,
    id: ValueId,
}

impl<K: Kind + Default, const SPLIT: bool> Slice<K, SPLIT> {
    /// An unset sequence
    pub fn new() -> Self {
        Self::with_kind(K::default())
    }

    /// A sequence set from each string in turn, or the first validation error
    pub fn try_new(ss: &[&str]) -> Result<Self, ValueError> {
        Self::new().try_set_all(ss)
    }

    /// A sequence set from each string in turn, for defaults given as literals.
    ///
    /// The result is completed, so the first provider which sets it replaces the default.
    ///
    /// # Panics
    ///
    /// If `ss` is empty or any string is not valid.
    #[track_caller]
    pub fn must(ss: &[&str]) -> Self {
        Self::new().must_set_all(ss)
    }
}

impl<K: Kind, const SPLIT: bool> Slice<K, SPLIT> {
    /// An unset sequence using a configured kind
    pub fn with_kind(kind: K) -> Self {
        Self {
            kind,
            values: None,
            raw: Vec::new(),
            completed: Cell::new(false),
            id: ValueId::next(),
        }
    }

    /// Set from each string in turn, then mark completed
    pub fn try_set_all(mut self, ss: &[&str]) -> Result<Self, ValueError> {
        for s in ss {
            Value::set(&mut self, s)?;
        }
        self.completed.set(true);
        Ok(self)
    }

    /// Set from each string in turn, then mark completed.
    ///
    /// # Panics
    ///
    /// If `ss` is empty or any string is not valid.
    #[track_caller]
    pub fn must_set_all(self, ss: &[&str]) -> Self {
        let type_name = self.type_name_static();
        assert!(!ss.is_empty(), "{type_name} requires at least 1 value");
        match self.try_set_all(ss) {
            Ok(result) => result,
            Err(err) => panic!("invalid {type_name} literal {ss:?}: {err}"),
        }
    }

    /// The current elements, if set. Marks the sequence completed.
    pub fn get(&self) -> Option<&[K::Output]> {
        let values = self.values.as_deref()?;
        self.completed.set(true);
        Some(values)
    }

    /// The current elements for a required setting.
    ///
    /// If unset, this returns an empty vec and puts a [`RequiredError`] for this value into
    /// `err`, unless `err` already holds an error.
    pub fn value(&self, err: &mut Option<Error>) -> Vec<K::Output> {
        match self.get() {
            Some(values) => values.to_vec(),
            None => {
                if err.is_none() {
                    *err = Some(RequiredError::new(self.id, self.type_name_static()).into());
                }
                Vec::new()
            }
        }
    }

    /// The parsing strategy of the elements
    pub fn kind(&self) -> &K {
        &self.kind
    }

    fn type_name_static(&self) -> &'static str {
        if SPLIT {
            K::SLICE_NAME
        } else {
            K::ARRAY_NAME
        }
    }

    fn clear(&mut self) {
        self.values = None;
        self.raw.clear();
    }

    // Parse `s` into elements and add them. On error the caller clears the sequence.
    fn extend(&mut self, s: &str) -> Result<(), ValueError> {
        if self.values.is_none() && s.is_empty() && !K::EMPTY_IS_ELEMENT {
            self.values = Some(Vec::new());
            return Ok(());
        }

        let segments: Vec<&str> = if SPLIT {
            s.split(',').collect()
        } else {
            vec![s]
        };
        for segment in segments {
            self.push(segment)?;
        }
        Ok(())
    }

    fn push(&mut self, segment: &str) -> Result<(), ValueError> {
        let value = self.kind.parse(segment)?;
        self.values.get_or_insert_with(Vec::new).push(value);
        self.raw.push(segment.to_owned());
        Ok(())
    }

    fn reset_if_completed(&mut self) {
        if self.completed.replace(false) {
            self.clear();
        }
    }
}

impl<K: Kind + Default, const SPLIT: bool> Default for Slice<K, SPLIT> {
    fn default() -> Self {
        Self::new()
    }
}

// A clone is a distinct cell, so it gets its own id.
impl<K: Kind, const SPLIT: bool> Clone for Slice<K, SPLIT> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            values: self.values.clone(),
            raw: self.raw.clone(),
            completed: self.completed.clone(),
            id: ValueId::next(),
        }
    }
}

impl<K: Kind, const SPLIT: bool> fmt::Display for Slice<K, SPLIT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(values) = self.values.as_ref() else {
            return Ok(());
        };
        write!(f, "[")?;
        for (idx, value) in values.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            self.kind.format(value, f)?;
        }
        write!(f, "]")
    }
}

impl<K: Kind, const SPLIT: bool> fmt::Debug for Slice<K, SPLIT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.type_name_static())
            .field("values", &self.values)
            .field("completed", &self.completed.get())
            .field("id", &self.id)
            .finish()
    }
}

impl<K: Kind, const SPLIT: bool> Value for Slice<K, SPLIT> {
    fn set(&mut self, s: &str) -> Result<(), ValueError> {
        self.reset_if_completed();
        self.extend(s).map_err(|err| {
            self.clear();
            err
        })
    }

    fn get_any(&self) -> Option<&dyn Any> {
        let values = self.values.as_ref()?;
        self.completed.set(true);
        Some(values as &dyn Any)
    }

    fn type_name(&self) -> &'static str {
        self.type_name_static()
    }

    fn is_bool_flag(&self) -> bool {
        K::IS_BOOL
    }

    fn id(&self) -> ValueId {
        self.id
    }
}

impl<K: Kind, const SPLIT: bool> SliceValue for Slice<K, SPLIT> {
    fn append(&mut self, s: &str) -> Result<(), ValueError> {
        self.reset_if_completed();
        self.push(s).map_err(|err| {
            self.clear();
            err
        })
    }

    fn replace(&mut self, ss: &[&str]) -> Result<(), ValueError> {
        self.completed.set(false);
        self.clear();
        self.values = Some(Vec::new());
        for s in ss {
            if let Err(err) = self.push(s) {
                self.clear();
                return Err(err);
            }
        }
        Ok(())
    }

    fn get_slice(&self) -> Vec<String> {
        self.raw.clone()
    }
}

impl<const SPLIT: bool> Slice<kind::OneOf, SPLIT> {
    /// An unset sequence whose elements must be one of the given strings
    pub fn one_of(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::with_kind(kind::OneOf::new(allowed))
    }
}

impl<const SPLIT: bool> Slice<kind::Between, SPLIT> {
    /// An unset sequence whose elements must be integers from `min` to `max`, inclusive
    pub fn between(min: i64, max: i64) -> Self {
        Self::with_kind(kind::Between::new(min, max))
    }
}

impl<const SPLIT: bool> Slice<kind::HostPort, SPLIT> {
    /// The addresses as they were given, if set. Marks the sequence completed.
    pub fn strings(&self) -> Option<&[String]> {
        self.get()?;
        Some(&self.raw)
    }

    /// The parsed addresses, if set. Marks the sequence completed.
    pub fn tuples(&self) -> Option<&[HostPortTuple]> {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BoolSlice, DurationSlice, HostPortSlice, IntBetweenSlice, ListenPortSlice,
        NotEmptyStrArray, OneOfStrSlice, StrArray, StrSlice,
    };
    use assert_matches::assert_matches;
    use std::time::Duration;

    #[test]
    fn test_unset() {
        let v = DurationSlice::new();
        assert_eq!(v.to_string(), "");
        assert!(v.get().is_none());
        assert!(v.get_any().is_none());
        assert_eq!(v.type_name(), "DurationSlice");
        assert_eq!(StrArray::new().type_name(), "StringArray");
        assert_eq!(NotEmptyStrArray::new().type_name(), "NotEmptyStringArray");
    }

    #[test]
    fn test_append_then_replace() {
        let mut v = DurationSlice::new();
        v.set("1s").unwrap();
        v.set("2s").unwrap();
        assert_eq!(
            v.get(),
            Some(&[Duration::from_secs(1), Duration::from_secs(2)][..])
        );

        v.set("3s").unwrap();
        assert_eq!(v.get(), Some(&[Duration::from_secs(3)][..]));
        assert_eq!(v.to_string(), "[3s]");
    }

    #[test]
    fn test_get_any_completes() {
        let mut v = ListenPortSlice::new();
        v.set("80").unwrap();
        assert!(v.get_any().is_some());
        v.set("443").unwrap();
        assert_eq!(v.get(), Some(&[443][..]));
    }

    #[test]
    fn test_get_on_unset_does_not_complete() {
        let mut v = ListenPortSlice::new();
        assert!(v.get().is_none());
        v.set("80").unwrap();
        v.set("443").unwrap();
        assert_eq!(v.get(), Some(&[80, 443][..]));
    }

    #[test]
    fn test_empty_string_is_empty_list() {
        let mut v = BoolSlice::new();
        v.set("").unwrap();
        assert_eq!(v.get(), Some(&[][..]));
        assert_eq!(v.to_string(), "[]");

        let mut err = None;
        assert!(v.value(&mut err).is_empty());
        assert!(err.is_none());

        // Empty is only special on an unset sequence
        let mut v = BoolSlice::new();
        v.set("t").unwrap();
        assert_matches!(v.set(""), Err(ValueError::InvalidBool(_)));
        assert!(v.get().is_none());
    }

    #[test]
    fn test_empty_string_is_element_for_strings() {
        let mut v = StrSlice::new();
        v.set("").unwrap();
        assert_eq!(v.get(), Some(&[String::new()][..]));

        let mut v = StrSlice::new();
        v.set("a,,b").unwrap();
        assert_eq!(v.value(&mut None), vec!["a", "", "b"]);

        let mut v = StrArray::new();
        v.set("a,b").unwrap();
        v.set("c").unwrap();
        assert_eq!(v.value(&mut None), vec!["a,b", "c"]);
    }

    #[test]
    fn test_failed_set_clears() {
        let mut v = ListenPortSlice::must(&["80", "443"]);
        assert_eq!(
            v.set("1,-1,2").unwrap_err().to_string(),
            "not between 0 and 65535"
        );
        assert!(v.get().is_none());

        let mut v = ListenPortSlice::new();
        v.set("1").unwrap();
        assert!(v.set("2,x").is_err());
        assert!(v.get().is_none());
        assert!(v.get_slice().is_empty());
    }

    #[test]
    fn test_must_is_completed() {
        let mut v = IntBetweenSlice::between(1, 3).must_set_all(&["1", "2"]);
        v.set("3").unwrap();
        assert_eq!(v.get(), Some(&[3][..]));
        assert_matches!(v.set("4"), Err(ValueError::NotBetween { min: 1, max: 3 }));
    }

    #[test]
    #[should_panic(expected = "requires at least 1 value")]
    fn test_must_requires_values() {
        ListenPortSlice::must(&[]);
    }

    #[test]
    fn test_required() {
        let v = OneOfStrSlice::one_of(["a", "b"]);
        let mut err = None;
        assert!(v.value(&mut err).is_empty());
        assert_matches!(err, Some(Error::Required(req)) if req.id() == v.id() && req.type_name() == "OneOfStringSlice");
    }

    #[test]
    fn test_host_port_slice() {
        let mut v = HostPortSlice::new();
        v.set("example.com:080,[::1]:443").unwrap();
        assert_eq!(
            v.strings(),
            Some(&["example.com:080".to_owned(), "[::1]:443".to_owned()][..])
        );
        let tuples = v.tuples().unwrap();
        assert_eq!(tuples[0].host, "example.com");
        assert_eq!(tuples[0].port, 80);
        assert_eq!(tuples[1].host, "::1");
        assert_eq!(v.to_string(), "[example.com:80,[::1]:443]");

        // completed by the reads above, so this replaces both sequences
        v.set("localhost:1").unwrap();
        assert_eq!(v.strings(), Some(&["localhost:1".to_owned()][..]));
        assert_eq!(v.tuples().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_slice_value() {
        let mut v = StrSlice::new();
        v.append("a,b").unwrap();
        v.append("c").unwrap();
        assert_eq!(v.get_slice(), vec!["a,b", "c"]);

        v.replace(&["x"]).unwrap();
        assert_eq!(v.value(&mut None), vec!["x"]);

        let mut v = ListenPortSlice::new();
        v.replace(&[]).unwrap();
        assert_eq!(v.get(), Some(&[][..]));
        assert!(v.replace(&["1", "70000"]).is_err());
        assert!(v.get().is_none());
    }
}
