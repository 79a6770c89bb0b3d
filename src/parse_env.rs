use std::collections::BTreeMap;
use std::ffi::OsString;

/// A snapshot of environment variables, used instead of the process environment.
#[derive(Clone, Debug, Default)]
pub struct ParsedEnv {
    map: BTreeMap<String, OsString>,
}

impl ParsedEnv {
    /// Get the OsString. The caller decides what to do if it is not valid utf8.
    pub fn get(&self, name: &str) -> Option<&OsString> {
        self.map.get(name)
    }
}

/// Parse a generic thing that looks like std::env::vars_os but might be test data,
/// and store it in a searchable container.
pub fn parse_env<K, V>(env_vars_os: impl IntoIterator<Item = (K, V)>) -> ParsedEnv
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    // Non-utf8 keys can never be named by an `env` tag, so they are dropped here. Non-utf8
    // values are kept, and only fail if a field actually reads them.
    ParsedEnv {
        map: env_vars_os
            .into_iter()
            .filter_map(|(key, val)| Some((key.into().into_string().ok()?, val.into())))
            .collect(),
    }
}
