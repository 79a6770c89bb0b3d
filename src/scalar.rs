use crate::kind::{self, Kind};
use crate::{Error, RequiredError, Value, ValueError, ValueId};
use core::any::Any;
use std::fmt;

/// A single configuration value of some [`Kind`], which may be unset.
///
/// Usually used through one of the aliases like [`crate::Port`] or [`crate::Duration`].
pub struct Scalar<K: Kind> {
    kind: K,
    value: Option<K::Output>,
    id: ValueId,
}

impl<K: Kind + Default> Scalar<K> {
    /// An unset value
    pub fn new() -> Self {
        Self::with_kind(K::default())
    }

    /// A value set from `s`, or the validation error
    pub fn try_new(s: &str) -> Result<Self, ValueError> {
        Self::new().try_set(s)
    }

    /// A value set from `s`, for defaults given as literals.
    ///
    /// # Panics
    ///
    /// If `s` is not valid. This is meant for string literals in startup code, where an invalid
    /// default is a bug.
    #[track_caller]
    pub fn must(s: &str) -> Self {
        Self::new().must_set(s)
    }
}

impl<K: Kind> Scalar<K> {
    /// An unset value using a configured kind, e.g. with an allowed range
    pub fn with_kind(kind: K) -> Self {
        Self {
            kind,
            value: None,
            id: ValueId::next(),
        }
    }

    /// Set from `s`, consuming and returning self
    pub fn try_set(mut self, s: &str) -> Result<Self, ValueError> {
        Value::set(&mut self, s)?;
        Ok(self)
    }

    /// Set from `s`, consuming and returning self.
    ///
    /// # Panics
    ///
    /// If `s` is not valid.
    #[track_caller]
    pub fn must_set(self, s: &str) -> Self {
        match self.try_set(s) {
            Ok(result) => result,
            Err(err) => panic!("invalid {} literal {s:?}: {err}", K::NAME),
        }
    }

    /// The current value, if set
    pub fn get(&self) -> Option<&K::Output> {
        self.value.as_ref()
    }

    /// The current value for a required setting.
    ///
    /// If unset, this returns the zero value and puts a [`RequiredError`] for this value into
    /// `err`, unless `err` already holds an error. This lets many reads share one error slot,
    /// which ends up holding the first failure.
    pub fn value(&self, err: &mut Option<Error>) -> K::Output {
        match self.value.as_ref() {
            Some(value) => value.clone(),
            None => {
                if err.is_none() {
                    *err = Some(RequiredError::new(self.id, K::NAME).into());
                }
                K::Output::default()
            }
        }
    }

    /// The parsing strategy of this value
    pub fn kind(&self) -> &K {
        &self.kind
    }
}

impl<K: Kind + Default> Default for Scalar<K> {
    fn default() -> Self {
        Self::new()
    }
}

// A clone is a distinct cell, so it gets its own id.
impl<K: Kind> Clone for Scalar<K> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            value: self.value.clone(),
            id: ValueId::next(),
        }
    }
}

impl<K: Kind> fmt::Display for Scalar<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.as_ref() {
            Some(value) => self.kind.format(value, f),
            None => Ok(()),
        }
    }
}

impl<K: Kind> fmt::Debug for Scalar<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("value", &self.value)
            .field("id", &self.id)
            .finish()
    }
}

impl<K: Kind> Value for Scalar<K> {
    fn set(&mut self, s: &str) -> Result<(), ValueError> {
        match self.kind.parse(s) {
            Ok(value) => {
                self.value = Some(value);
                Ok(())
            }
            Err(err) => {
                self.value = None;
                Err(err)
            }
        }
    }

    fn get_any(&self) -> Option<&dyn Any> {
        self.value.as_ref().map(|value| value as &dyn Any)
    }

    fn type_name(&self) -> &'static str {
        K::NAME
    }

    fn is_bool_flag(&self) -> bool {
        K::IS_BOOL
    }

    fn id(&self) -> ValueId {
        self.id
    }
}

impl Scalar<kind::OneOf> {
    /// An unset value which accepts exactly the given strings
    pub fn one_of(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::with_kind(kind::OneOf::new(allowed))
    }
}

impl Scalar<kind::Between> {
    /// An unset value which accepts integers from `min` to `max`, inclusive
    pub fn between(min: i64, max: i64) -> Self {
        Self::with_kind(kind::Between::new(min, max))
    }
}

impl Scalar<kind::HostPort> {
    /// The host part, if set
    pub fn host(&self) -> Option<&str> {
        self.get().map(|tuple| tuple.host.as_str())
    }

    /// The port part, if set
    pub fn port(&self) -> Option<u16> {
        self.get().map(|tuple| tuple.port)
    }
}
