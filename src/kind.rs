//! Parsing and validation strategies, one per kind of configuration value.
//!
//! A [`Kind`] knows how to turn one string into a native value and back. [`crate::Scalar`] and
//! [`crate::Slice`] supply the unset/set bookkeeping on top of it, so adding a new kind of value
//! only requires a new `Kind`.

use crate::{str_to_bool, ValueError};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::num::IntErrorKind;
use std::str::FromStr;

const INVALID_SYNTAX: &str = "invalid syntax";
const OUT_OF_RANGE: &str = "value out of range";

/// How to parse, validate and render one kind of value.
pub trait Kind: Clone {
    /// The native type produced by parsing
    type Output: Clone + Default + fmt::Debug + 'static;

    /// Type name of a single value
    const NAME: &'static str;
    /// Type name of a comma-separated sequence of these values
    const SLICE_NAME: &'static str;
    /// Type name of a sequence which takes one whole string per element.
    /// Only kinds whose values may contain commas have one.
    const ARRAY_NAME: &'static str = Self::SLICE_NAME;
    /// True if the empty string is itself a valid element, rather than meaning "empty list"
    const EMPTY_IS_ELEMENT: bool = false;
    /// True if this is a boolean, so that a bare flag means "true"
    const IS_BOOL: bool = false;

    /// Parse and validate one value
    fn parse(&self, s: &str) -> Result<Self::Output, ValueError>;

    /// Render a value in a form `parse` accepts
    fn format(&self, value: &Self::Output, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// `1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False`
#[derive(Clone, Copy, Debug, Default)]
pub struct Bool;

impl Kind for Bool {
    type Output = bool;
    const NAME: &'static str = "Bool";
    const SLICE_NAME: &'static str = "BoolSlice";
    const IS_BOOL: bool = true;

    fn parse(&self, s: &str) -> Result<bool, ValueError> {
        str_to_bool(s).ok_or_else(|| ValueError::InvalidBool(s.to_owned()))
    }

    fn format(&self, value: &bool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{value}")
    }
}

/// Any string, even empty
#[derive(Clone, Copy, Debug, Default)]
pub struct Str;

impl Kind for Str {
    type Output = String;
    const NAME: &'static str = "String";
    const SLICE_NAME: &'static str = "StringSlice";
    const ARRAY_NAME: &'static str = "StringArray";
    const EMPTY_IS_ELEMENT: bool = true;

    fn parse(&self, s: &str) -> Result<String, ValueError> {
        Ok(s.to_owned())
    }

    fn format(&self, value: &String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(value)
    }
}

/// Any string with at least one non-whitespace character
#[derive(Clone, Copy, Debug, Default)]
pub struct NotEmptyStr;

impl Kind for NotEmptyStr {
    type Output = String;
    const NAME: &'static str = "NotEmptyString";
    const SLICE_NAME: &'static str = "NotEmptyStringSlice";
    const ARRAY_NAME: &'static str = "NotEmptyStringArray";

    fn parse(&self, s: &str) -> Result<String, ValueError> {
        if s.trim().is_empty() {
            return Err(ValueError::EmptyOrWhitespace);
        }
        Ok(s.to_owned())
    }

    fn format(&self, value: &String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(value)
    }
}

/// Exactly one of a fixed set of strings
#[derive(Clone, Debug, Default)]
pub struct OneOf {
    allowed: Vec<String>,
}

impl OneOf {
    /// Allow exactly these strings
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// The allowed strings
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl Kind for OneOf {
    type Output = String;
    const NAME: &'static str = "OneOfString";
    const SLICE_NAME: &'static str = "OneOfStringSlice";

    fn parse(&self, s: &str) -> Result<String, ValueError> {
        if self.allowed.iter().any(|item| item == s) {
            Ok(s.to_owned())
        } else {
            Err(ValueError::NotOneOf {
                allowed: self.allowed.clone(),
            })
        }
    }

    fn format(&self, value: &String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(value)
    }
}

/// An url with a host. Trailing slashes are removed, so paths can be appended with `format!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Endpoint;

impl Kind for Endpoint {
    type Output = String;
    const NAME: &'static str = "Endpoint";
    const SLICE_NAME: &'static str = "EndpointSlice";

    fn parse(&self, s: &str) -> Result<String, ValueError> {
        let s = s.trim_end_matches('/');
        let parsed = url::Url::parse(s).map_err(|source| ValueError::InvalidUrl {
            input: s.to_owned(),
            source,
        })?;
        match parsed.host_str() {
            Some(host) if !host.is_empty() => Ok(s.to_owned()),
            _ => Err(ValueError::NoHost),
        }
    }

    fn format(&self, value: &String, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(value)
    }
}

macro_rules! integer_kind {
    ($(#[$doc:meta])* $kind:ident, $output:ty, $name:literal, $slice_name:literal, $parse:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $kind;

        impl Kind for $kind {
            type Output = $output;
            const NAME: &'static str = $name;
            const SLICE_NAME: &'static str = $slice_name;

            fn parse(&self, s: &str) -> Result<$output, ValueError> {
                $parse(s)
            }

            fn format(&self, value: &$output, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{value}")
            }
        }
    };
}

integer_kind!(
    /// Platform-width signed integer literal; `0b`, `0o`, `0x` prefixes and `_` separators allowed
    Int,
    isize,
    "Int",
    "IntSlice",
    |s: &str| {
        let wide = parse_int_literal(s)?;
        isize::try_from(wide).map_err(|_| ValueError::Overflow {
            kind: "int",
            input: s.to_owned(),
        })
    }
);

integer_kind!(
    /// 64-bit signed integer literal; `0b`, `0o`, `0x` prefixes and `_` separators allowed
    Int64,
    i64,
    "Int64",
    "Int64Slice",
    parse_int_literal
);

integer_kind!(
    /// Platform-width unsigned integer literal; `0b`, `0o`, `0x` prefixes and `_` separators allowed
    Uint,
    usize,
    "Uint",
    "UintSlice",
    |s: &str| {
        let wide = parse_uint_literal(s)?;
        usize::try_from(wide).map_err(|_| ValueError::Overflow {
            kind: "unsigned int",
            input: s.to_owned(),
        })
    }
);

integer_kind!(
    /// 64-bit unsigned integer literal; `0b`, `0o`, `0x` prefixes and `_` separators allowed
    Uint64,
    u64,
    "Uint64",
    "Uint64Slice",
    parse_uint_literal
);

integer_kind!(
    /// Port number, 1 to 65535
    Port,
    u16,
    "Port",
    "PortSlice",
    |s: &str| parse_in_range(s, 1, u16::MAX.into()).map(|i| i as u16)
);

integer_kind!(
    /// Port number to listen on, 0 (any free port) to 65535
    ListenPort,
    u16,
    "ListenPort",
    "ListenPortSlice",
    |s: &str| parse_in_range(s, 0, u16::MAX.into()).map(|i| i as u16)
);

/// 64-bit float literal
#[derive(Clone, Copy, Debug, Default)]
pub struct Float64;

impl Kind for Float64 {
    type Output = f64;
    const NAME: &'static str = "Float64";
    const SLICE_NAME: &'static str = "Float64Slice";

    fn parse(&self, s: &str) -> Result<f64, ValueError> {
        s.parse().map_err(|source| ValueError::InvalidFloat {
            input: s.to_owned(),
            source,
        })
    }

    fn format(&self, value: &f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{value}")
    }
}

/// Decimal integer within an inclusive range
#[derive(Clone, Copy, Debug, Default)]
pub struct Between {
    min: i64,
    max: i64,
}

impl Between {
    /// Allow integers from `min` to `max`, inclusive
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Inclusive lower bound
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Inclusive upper bound
    pub fn max(&self) -> i64 {
        self.max
    }
}

impl Kind for Between {
    type Output = i64;
    const NAME: &'static str = "IntBetween";
    const SLICE_NAME: &'static str = "IntBetweenSlice";

    fn parse(&self, s: &str) -> Result<i64, ValueError> {
        parse_in_range(s, self.min, self.max)
    }

    fn format(&self, value: &i64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{value}")
    }
}

/// An IPv4 or IPv6 network in CIDR notation
#[derive(Clone, Copy, Debug, Default)]
pub struct IpNet;

impl Kind for IpNet {
    type Output = Cidr;
    const NAME: &'static str = "IPNet";
    const SLICE_NAME: &'static str = "IPNetSlice";

    fn parse(&self, s: &str) -> Result<Cidr, ValueError> {
        s.parse()
    }

    fn format(&self, value: &Cidr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{value}")
    }
}

/// A `host:port` pair; IPv6 hosts are written in brackets
#[derive(Clone, Copy, Debug, Default)]
pub struct HostPort;

impl Kind for HostPort {
    type Output = HostPortTuple;
    const NAME: &'static str = "HostPort";
    const SLICE_NAME: &'static str = "HostPortSlice";

    fn parse(&self, s: &str) -> Result<HostPortTuple, ValueError> {
        let (host, port) = split_host_port(s).map_err(|reason| ValueError::InvalidHostPort {
            input: s.to_owned(),
            reason,
        })?;
        if host.is_empty() {
            return Err(ValueError::NoHost);
        }
        let port = port.parse().map_err(ValueError::InvalidPort)?;
        Ok(HostPortTuple {
            host: host.to_owned(),
            port,
        })
    }

    fn format(&self, value: &HostPortTuple, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{value}")
    }
}

/// A duration such as `30s`, `1h30m` or `250ms`
#[derive(Clone, Copy, Debug, Default)]
pub struct Duration;

impl Kind for Duration {
    type Output = std::time::Duration;
    const NAME: &'static str = "Duration";
    const SLICE_NAME: &'static str = "DurationSlice";

    fn parse(&self, s: &str) -> Result<std::time::Duration, ValueError> {
        humantime::parse_duration(s).map_err(|source| ValueError::InvalidDuration {
            input: s.to_owned(),
            source,
        })
    }

    fn format(&self, value: &std::time::Duration, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(*value))
    }
}

/// Parsed `host:port` pair
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct HostPortTuple {
    /// Host name or address, without brackets
    pub host: String,
    /// Port number
    pub port: u16,
}

impl fmt::Display for HostPortTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// An IP network: the address with all host bits cleared, and the prefix length.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Cidr {
    addr: IpAddr,
    prefix_len: u8,
}

impl Cidr {
    /// Network address
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Number of leading bits in the network mask
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// True if `ip` belongs to this network
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                mask_v4(ip, self.prefix_len) == net
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                mask_v6(ip, self.prefix_len) == net
            }
            _ => false,
        }
    }
}

impl Default for Cidr {
    fn default() -> Self {
        Self {
            addr: Ipv4Addr::UNSPECIFIED.into(),
            prefix_len: 0,
        }
    }
}

impl FromStr for Cidr {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::InvalidCidr(s.to_owned());

        let (addr, bits) = s.split_once('/').ok_or_else(invalid)?;
        if bits.is_empty() || !bits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
        let prefix_len: u8 = bits.parse().map_err(|_| invalid())?;

        let addr = match addr {
            IpAddr::V4(ip) if prefix_len <= 32 => IpAddr::V4(mask_v4(ip, prefix_len)),
            IpAddr::V6(ip) if prefix_len <= 128 => IpAddr::V6(mask_v6(ip, prefix_len)),
            _ => return Err(invalid()),
        };
        Ok(Self { addr, prefix_len })
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

fn mask_v4(ip: Ipv4Addr, prefix_len: u8) -> Ipv4Addr {
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix_len)).unwrap_or(0);
    Ipv4Addr::from(u32::from(ip) & mask)
}

fn mask_v6(ip: Ipv6Addr, prefix_len: u8) -> Ipv6Addr {
    let mask = u128::MAX.checked_shl(128 - u32::from(prefix_len)).unwrap_or(0);
    Ipv6Addr::from(u128::from(ip) & mask)
}

// Split "host:port", "[host]:port" or "[ipv6%zone]:port" without validating either part.
fn split_host_port(s: &str) -> Result<(&str, &str), &'static str> {
    let colon = s.rfind(':').ok_or("missing port in address")?;

    let host = if let Some(rest) = s.strip_prefix('[') {
        let end = rest.find(']').ok_or("missing ']' in address")?;
        // The closing bracket has to be followed directly by the last colon
        match end + 2 {
            idx if idx == colon => {}
            idx if idx == s.len() => return Err("missing port in address"),
            _ => {
                return Err(if s.as_bytes()[end + 2] == b':' {
                    "too many colons in address"
                } else {
                    "missing port in address"
                })
            }
        }
        &rest[..end]
    } else {
        let host = &s[..colon];
        if host.contains(':') {
            return Err("too many colons in address");
        }
        host
    };

    if host.contains(['[', ']']) {
        return Err("unexpected bracket in address");
    }
    Ok((host, &s[colon + 1..]))
}

// Decimal integer (optional sign) checked against an inclusive range.
fn parse_in_range(s: &str, min: i64, max: i64) -> Result<i64, ValueError> {
    let i: i64 = s.parse().map_err(|err: std::num::ParseIntError| ValueError::InvalidInt {
        input: s.to_owned(),
        reason: int_error_reason(err.kind()),
    })?;
    if !(min..=max).contains(&i) {
        return Err(ValueError::NotBetween { min, max });
    }
    Ok(i)
}

fn int_error_reason(kind: &IntErrorKind) -> &'static str {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => OUT_OF_RANGE,
        _ => INVALID_SYNTAX,
    }
}

/// Parse a signed integer literal, with optional sign, base prefix and `_` digit separators.
pub(crate) fn parse_int_literal(s: &str) -> Result<i64, ValueError> {
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = i128::from(parse_magnitude(s, body)?);
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| ValueError::InvalidInt {
        input: s.to_owned(),
        reason: OUT_OF_RANGE,
    })
}

/// Parse an unsigned integer literal, with optional base prefix and `_` digit separators.
pub(crate) fn parse_uint_literal(s: &str) -> Result<u64, ValueError> {
    parse_magnitude(s, s)
}

fn parse_magnitude(input: &str, body: &str) -> Result<u64, ValueError> {
    let syntax_error = || ValueError::InvalidInt {
        input: input.to_owned(),
        reason: INVALID_SYNTAX,
    };

    let (radix, digits, prefixed) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..], true),
        Some("0o" | "0O") => (8, &body[2..], true),
        Some("0b" | "0B") => (2, &body[2..], true),
        // A leading zero alone means octal
        _ if body.len() > 1 && body.starts_with('0') => (8, &body[1..], true),
        _ => (10, body, false),
    };

    // Separators go between digits, or right after a base prefix
    if (digits.starts_with('_') && !prefixed) || digits.ends_with('_') || digits.contains("__") {
        return Err(syntax_error());
    }
    let digits = digits.replace('_', "");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(syntax_error());
    }

    u64::from_str_radix(&digits, radix).map_err(|err| ValueError::InvalidInt {
        input: input.to_owned(),
        reason: int_error_reason(err.kind()),
    })
}
