use crate::{Tags, ValueId};
use std::num::ParseFloatError;
use thiserror::Error;

/// A value was rejected by the validation rules of its type.
///
/// A value which returns this from `set` is left unset.
#[derive(Debug, Error)]
pub enum ValueError {
    /// Empty string, or only whitespace
    #[error("empty or whitespace-only")]
    EmptyOrWhitespace,
    /// An url or address without a host part
    #[error("no host")]
    NoHost,
    /// Parsed fine at 64 bits but doesn't fit the platform width
    #[error("value overflows {kind}: {input}")]
    Overflow {
        /// Name of the target integer type
        kind: &'static str,
        /// Input text
        input: String,
    },
    /// Not in the allowed set
    #[error("not one of {allowed:?}")]
    NotOneOf {
        /// The allowed strings
        allowed: Vec<String>,
    },
    /// Outside of an inclusive range
    #[error("not between {min} and {max}")]
    NotBetween {
        /// Lower bound
        min: i64,
        /// Upper bound
        max: i64,
    },
    /// Not a boolean literal
    #[error("invalid bool {0:?}")]
    InvalidBool(String),
    /// Not an integer literal, or out of range for the integer type
    #[error("invalid integer {input:?}: {reason}")]
    InvalidInt {
        /// Input text
        input: String,
        /// "invalid syntax" or "value out of range"
        reason: &'static str,
    },
    /// Not a floating point literal
    #[error("invalid float {input:?}: {source}")]
    InvalidFloat {
        /// Input text
        input: String,
        /// Underlying parse error
        source: ParseFloatError,
    },
    /// Not a duration literal
    #[error("invalid duration {input:?}: {source}")]
    InvalidDuration {
        /// Input text
        input: String,
        /// Underlying parse error
        source: humantime::DurationError,
    },
    /// Not an url
    #[error("invalid url {input:?}: {source}")]
    InvalidUrl {
        /// Input text
        input: String,
        /// Underlying parse error
        source: url::ParseError,
    },
    /// Not in CIDR notation
    #[error("invalid CIDR address {0:?}")]
    InvalidCidr(String),
    /// Not a `host:port` pair
    #[error("address {input:?}: {reason}")]
    InvalidHostPort {
        /// Input text
        input: String,
        /// What is wrong with it
        reason: &'static str,
    },
    /// The port part of a `host:port` pair is not a port number
    #[error("port: {0}")]
    InvalidPort(std::num::ParseIntError),
}

/// A typed required-read found its value unset.
///
/// This carries the identity of the value which was read, so that [`crate::wrap_err`] can find
/// which field (and which flag) it belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("value required")]
pub struct RequiredError {
    id: ValueId,
    type_name: &'static str,
}

impl RequiredError {
    pub(crate) fn new(id: ValueId, type_name: &'static str) -> Self {
        Self { id, type_name }
    }

    /// Identity of the value which was unset
    pub fn id(&self) -> ValueId {
        self.id
    }

    /// Type name of the value which was unset
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// An error which occurs while providing or reading configuration values.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation failed with no further context
    #[error(transparent)]
    Value(#[from] ValueError),
    /// An environment variable had an invalid value
    #[error("${name}={value:?}: {source}")]
    Env {
        /// Full variable name, including prefix
        name: String,
        /// The value after optional trimming
        value: String,
        /// Why it was rejected
        source: ValueError,
    },
    /// An environment variable was not valid UTF-8
    #[error("${name}: not valid UTF-8")]
    InvalidUtf8Env {
        /// Full variable name, including prefix
        name: String,
    },
    /// A command line flag had an invalid value
    #[error("{flag}={value:?}: {source}")]
    Flag {
        /// Flag spelling, e.g. `--port`
        flag: String,
        /// Argument given to the flag
        value: String,
        /// Why it was rejected
        source: ValueError,
    },
    /// A provider failed on a field of a config struct
    #[error("{field}{}: {source}", .tags.quoted_suffix())]
    Field {
        /// Field name
        field: String,
        /// Field tags
        tags: Tags,
        /// What the provider reported
        source: Box<Error>,
    },
    /// A required value was read while unset
    #[error(transparent)]
    Required(#[from] RequiredError),
    /// A required value was read while unset, with the field it belongs to
    #[error("{field}{}: {source}", parenthesized(.context))]
    RequiredField {
        /// Field name
        field: String,
        /// Flag spelling and tags of the field, may be empty
        context: String,
        /// The error from the required read
        source: RequiredError,
    },
    /// A third-party provider failed
    #[error("{0}")]
    Provider(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Find the `RequiredError` this error is, or wraps, if any
    pub fn required(&self) -> Option<&RequiredError> {
        match self {
            Self::Required(err) => Some(err),
            Self::RequiredField { source, .. } => Some(source),
            Self::Field { source, .. } => source.required(),
            _ => None,
        }
    }

    /// Wrap an error from a provider which is not part of this crate
    pub fn provider(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Provider(err.into())
    }
}

fn parenthesized(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" ({context})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = Error::Field {
            field: "Host".into(),
            tags: Tags::parse(r#"env:"HOST""#),
            source: Box::new(Error::Env {
                name: "EXAMPLE_HOST".into(),
                value: "".into(),
                source: ValueError::EmptyOrWhitespace,
            }),
        };
        assert_eq!(
            err.to_string(),
            r#"Host `env:"HOST"`: $EXAMPLE_HOST="": empty or whitespace-only"#
        );

        let err = Error::Field {
            field: "Timeout".into(),
            tags: Tags::default(),
            source: Box::new(ValueError::NoHost.into()),
        };
        assert_eq!(err.to_string(), "Timeout: no host");
    }

    #[test]
    fn test_required_field_display() {
        let source = RequiredError::new(ValueId::next(), "Port");
        let err = Error::RequiredField {
            field: "Port".into(),
            context: r#"--port env:"PORT""#.into(),
            source,
        };
        assert_eq!(err.to_string(), r#"Port (--port env:"PORT"): value required"#);

        let err = Error::RequiredField {
            field: "Port".into(),
            context: String::new(),
            source,
        };
        assert_eq!(err.to_string(), "Port: value required");
    }

    #[test]
    fn test_required_is_found_through_wrapping() {
        let source = RequiredError::new(ValueId::next(), "Bool");
        let err = Error::Field {
            field: "Debug".into(),
            tags: Tags::default(),
            source: Box::new(source.into()),
        };
        assert_eq!(err.required(), Some(&source));
        assert_eq!(Error::from(ValueError::NoHost).required(), None);
    }
}
