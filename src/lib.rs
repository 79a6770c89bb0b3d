//! Typed configuration values which know whether they were set, and the plumbing to fill
//! them from environment variables and command line flags.
//!
//! Each setting of a program is a field of a plain struct, with a value type from this crate
//! such as [`Port`], [`NotEmptyStr`] or [`DurationSlice`]. Values validate their input when set,
//! and distinguish "never set" from "set to zero".
//!
//! ```
//! use confval::{provide_struct, wrap_err, Config, FlagSet, FromEnv, Int, NotEmptyStr, Port};
//!
//! #[derive(Config)]
//! struct Server {
//!     #[confval(env, flag, usage = "address to listen on")]
//!     host: NotEmptyStr,
//!     #[confval(env, flag)]
//!     port: Port,
//!     #[confval(env, flag)]
//!     retries: Int,
//! }
//!
//! let mut cfg = Server {
//!     host: NotEmptyStr::must("localhost"),
//!     port: Port::new(),
//!     retries: Int::new(),
//! };
//!
//! // Environment first, then flags on top of it
//! let env = FromEnv::new("MY_APP_").trim_space().vars([("MY_APP_PORT", " 8080")]);
//! provide_struct(&mut cfg, &[&env]).unwrap();
//!
//! let mut flags = FlagSet::new("server");
//! flags.add_tagged(&cfg);
//! let given = flags.parse_from(["server", "--host", "example.com"]).unwrap();
//! provide_struct(&mut cfg, &[&given]).unwrap();
//!
//! // Required reads share one error slot
//! let mut err = None;
//! let host = cfg.host.value(&mut err);
//! let port = cfg.port.value(&mut err);
//! let retries = cfg.retries.value(&mut err);
//! assert_eq!((host.as_str(), port, retries), ("example.com", 8080, 0));
//!
//! let err = wrap_err(err.unwrap(), Some(&flags), &[&cfg]);
//! assert_eq!(err.to_string(), r#"Retries (--retries env:"RETRIES" flag:"retries"): value required"#);
//! ```
#![deny(unsafe_code)]
#![deny(missing_docs)]

// The derive macro refers to this crate by name, including from within it
extern crate self as confval;

mod config;
mod env;
mod error;
mod flags;
pub mod kind;
mod parse_env;
mod scalar;
mod slice;
mod str_to_bool;
mod tags;
mod value;
mod wrap;

// These are not needed by users
use parse_env::{parse_env, ParsedEnv};

pub use config::{provide_struct, Config, Field, FieldMut, Provider};
pub use env::FromEnv;
pub use error::{Error, RequiredError, ValueError};
pub use flags::{FlagRegistry, FlagSet, FromFlags};
pub use kind::{Cidr, HostPortTuple, Kind};
pub use scalar::Scalar;
pub use slice::Slice;
pub use str_to_bool::str_to_bool;
pub use tags::Tags;
pub use value::{SliceValue, Value, ValueId};
pub use wrap::wrap_err;

pub use confval_derive::Config;

// CowStr lets field names and tags be built from string literals without allocating,
// and from computed strings when a Config is written by hand.
type CowStr = std::borrow::Cow<'static, str>;

/// `true`/`false`, also `1`, `t`, `T`, `TRUE`, `True` and so on
pub type Bool = Scalar<kind::Bool>;
/// Any string, including the empty string
pub type Str = Scalar<kind::Str>;
/// A string with at least one non-whitespace character
pub type NotEmptyStr = Scalar<kind::NotEmptyStr>;
/// One of a fixed set of strings, see [`Scalar::one_of`]
pub type OneOfStr = Scalar<kind::OneOf>;
/// An absolute url with a host, trailing slashes removed
pub type Endpoint = Scalar<kind::Endpoint>;
/// A platform width signed integer
pub type Int = Scalar<kind::Int>;
/// A 64 bit signed integer
pub type Int64 = Scalar<kind::Int64>;
/// A platform width unsigned integer
pub type Uint = Scalar<kind::Uint>;
/// A 64 bit unsigned integer
pub type Uint64 = Scalar<kind::Uint64>;
/// A 64 bit float
pub type Float64 = Scalar<kind::Float64>;
/// An integer in an inclusive range, see [`Scalar::between`]
pub type IntBetween = Scalar<kind::Between>;
/// A port number from 1 to 65535
pub type Port = Scalar<kind::Port>;
/// A port number to listen on, from 0 to 65535 (0 picks any free port)
pub type ListenPort = Scalar<kind::ListenPort>;
/// An IP network in CIDR notation
pub type IpNet = Scalar<kind::IpNet>;
/// A `host:port` address. The port must be a number from 0 to 65535; service names are rejected.
pub type HostPort = Scalar<kind::HostPort>;
/// A duration such as `1h30m`
pub type Duration = Scalar<kind::Duration>;

/// Comma-separated booleans
pub type BoolSlice = Slice<kind::Bool>;
/// Strings, one per `set` (no splitting on commas)
pub type StrArray = Slice<kind::Str, false>;
/// Comma-separated strings
pub type StrSlice = Slice<kind::Str>;
/// Non-empty strings, one per `set` (no splitting on commas)
pub type NotEmptyStrArray = Slice<kind::NotEmptyStr, false>;
/// Comma-separated non-empty strings
pub type NotEmptyStrSlice = Slice<kind::NotEmptyStr>;
/// Comma-separated strings from a fixed set, see [`Slice::one_of`]
pub type OneOfStrSlice = Slice<kind::OneOf>;
/// Comma-separated urls
pub type EndpointSlice = Slice<kind::Endpoint>;
/// Comma-separated platform width signed integers
pub type IntSlice = Slice<kind::Int>;
/// Comma-separated 64 bit signed integers
pub type Int64Slice = Slice<kind::Int64>;
/// Comma-separated platform width unsigned integers
pub type UintSlice = Slice<kind::Uint>;
/// Comma-separated 64 bit unsigned integers
pub type Uint64Slice = Slice<kind::Uint64>;
/// Comma-separated 64 bit floats
pub type Float64Slice = Slice<kind::Float64>;
/// Comma-separated integers in an inclusive range, see [`Slice::between`]
pub type IntBetweenSlice = Slice<kind::Between>;
/// Comma-separated port numbers from 1 to 65535
pub type PortSlice = Slice<kind::Port>;
/// Comma-separated port numbers from 0 to 65535
pub type ListenPortSlice = Slice<kind::ListenPort>;
/// Comma-separated IP networks
pub type IpNetSlice = Slice<kind::IpNet>;
/// Comma-separated `host:port` addresses
pub type HostPortSlice = Slice<kind::HostPort>;
/// Comma-separated durations
pub type DurationSlice = Slice<kind::Duration>;
