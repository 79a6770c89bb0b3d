use crate::CowStr;
use std::fmt;

/// Key/value metadata attached to one field of a config struct.
///
/// Keys are unique (the first occurrence of a key wins) and keep their declaration order.
/// Providers use tags to find their source for a field, e.g. `FromEnv` reads the `env` key.
///
/// `Display` renders tags in the conventional struct-tag form, `env:"HOST" flag:"host"`,
/// always on one line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tags {
    pairs: Vec<(CowStr, CowStr)>,
}

impl Tags {
    /// Build tags from owned or borrowed pairs
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<CowStr>,
        V: Into<CowStr>,
    {
        let mut result = Self::default();
        for (key, value) in pairs {
            result.push(key.into(), value.into());
        }
        result
    }

    /// Build tags from string literals. This is what `#[derive(Config)]` generates.
    pub fn from_static(pairs: &[(&'static str, &'static str)]) -> Self {
        Self::new(pairs.iter().copied())
    }

    /// Parse struct-tag text such as `env:"HOST" flag:"host"`.
    ///
    /// Newlines and tabs are treated as spaces, so tags may be spread over several lines.
    /// Parsing stops quietly at the first malformed pair.
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize(raw);
        let mut result = Self::default();
        let mut rest = normalized.as_str();

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }

            let Some(colon) = rest.find(|c: char| c == ':' || c == '"' || c <= ' ') else {
                break;
            };
            if colon == 0 || !rest[colon..].starts_with(":\"") {
                break;
            }
            let key = &rest[..colon];
            rest = &rest[colon + 1..];

            let Some((value, remaining)) = unquote_prefix(rest) else {
                break;
            };
            result.push(key.to_owned().into(), value.into());
            rest = remaining;
        }

        result
    }

    /// The value for `key`, or the empty string if the key is absent
    pub fn get(&self, key: &str) -> &str {
        self.lookup(key).unwrap_or_default()
    }

    /// The value for `key` if the key is present. The value may be empty.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
    }

    /// True if there are no tags
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the (key, value) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    // " `key:"value"`", or nothing when there are no tags. Used in error messages.
    pub(crate) fn quoted_suffix(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" `{self}`")
        }
    }

    fn push(&mut self, key: CowStr, value: CowStr) {
        if self.lookup(&key).is_some() {
            return;
        }
        let value = if value.contains(['\n', '\t']) {
            normalize(&value).into()
        } else {
            value
        };
        self.pairs.push((key, value));
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{key}:{value:?}")?;
        }
        Ok(())
    }
}

fn normalize(raw: &str) -> String {
    raw.replace(['\n', '\t'], " ")
}

// Given text starting with a double quote, return the unescaped content of the quoted string and
// whatever follows the closing quote.
fn unquote_prefix(text: &str) -> Option<(String, &str)> {
    let mut chars = text.char_indices();
    if chars.next()?.1 != '"' {
        return None;
    }

    let mut value = String::new();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Some((value, &text[idx + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            other => value.push(other),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lookup() {
        let tags = Tags::parse(r#"env:"HOST" flag:"host" usage:"host to \"connect\"""#);
        assert_eq!(tags.get("env"), "HOST");
        assert_eq!(tags.get("flag"), "host");
        assert_eq!(tags.get("usage"), "host to \"connect\"");
        assert_eq!(tags.lookup("env"), Some("HOST"));
        assert_eq!(tags.lookup("json"), None);
        assert_eq!(tags.get("json"), "");
    }

    #[test]
    fn test_parse_empty_value_is_present() {
        let tags = Tags::parse(r#"env:"""#);
        assert_eq!(tags.lookup("env"), Some(""));
        assert!(!tags.is_empty());
    }

    #[test]
    fn test_parse_multiline() {
        let tags = Tags::parse("env:\"PORT\"\n\t\tflag:\"port\"");
        assert_eq!(tags.get("env"), "PORT");
        assert_eq!(tags.get("flag"), "port");
        assert_eq!(tags.to_string(), r#"env:"PORT" flag:"port""#);
    }

    #[test]
    fn test_parse_stops_at_malformed() {
        let tags = Tags::parse(r#"env:"A" broken flag:"b""#);
        assert_eq!(tags.get("env"), "A");
        assert_eq!(tags.lookup("flag"), None);

        assert!(Tags::parse(r#"env:"unterminated"#).is_empty());
        assert!(Tags::parse(":\"x\"").is_empty());
    }

    #[test]
    fn test_first_key_wins() {
        let tags = Tags::from_static(&[("env", "A"), ("env", "B")]);
        assert_eq!(tags.get("env"), "A");
        assert_eq!(tags.iter().count(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Tags::default().to_string(), "");
        assert_eq!(Tags::default().quoted_suffix(), "");

        let tags = Tags::from_static(&[("env", "RETRIES"), ("usage", "how\nmany")]);
        assert_eq!(tags.get("usage"), "how many");
        assert_eq!(tags.to_string(), r#"env:"RETRIES" usage:"how many""#);
        assert_eq!(tags.quoted_suffix(), r#" `env:"RETRIES" usage:"how many"`"#);
    }
}
