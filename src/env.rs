use crate::{parse_env, Error, ParsedEnv, Provider, Tags, Value};
use std::ffi::OsString;
use tracing::trace;

/// Provides values from environment variables, named by the `env` tag of each field.
///
/// A field tagged `env:"PORT"` is read from `<prefix>PORT`. Fields without an `env` tag, or with
/// an empty one, are left to the next provider, and so are variables that are not set. A variable
/// set to the empty string is passed to the value, which decides if that is valid.
///
/// ```
/// # use confval::{provide_struct, Config, FromEnv, Port};
/// #[derive(Config)]
/// struct Server {
///     #[confval(env = "PORT")]
///     port: Port,
/// }
///
/// let mut server = Server { port: Port::must("80") };
/// let env = FromEnv::new("MY_APP_").vars([("MY_APP_PORT", "8080")]);
/// provide_struct(&mut server, &[&env]).unwrap();
/// assert_eq!(server.port.get(), Some(&8080));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FromEnv {
    prefix: String,
    trim_space: bool,
    vars: Option<ParsedEnv>,
}

impl FromEnv {
    /// Read variables named `prefix` followed by the `env` tag, from the process environment
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Remove leading and trailing whitespace from variable values before setting them
    pub fn trim_space(mut self) -> Self {
        self.trim_space = true;
        self
    }

    /// Read from the given variables instead of the process environment.
    ///
    /// This takes anything shaped like `std::env::vars_os()`, which is mostly useful in tests.
    pub fn vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.vars = Some(parse_env(vars));
        self
    }

    /// The prefix added to every variable name
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn lookup(&self, name: &str) -> Option<OsString> {
        match self.vars.as_ref() {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var_os(name),
        }
    }
}

impl Provider for FromEnv {
    fn provide(&self, value: &mut dyn Value, _name: &str, tags: &Tags) -> Result<bool, Error> {
        let key = match tags.lookup("env") {
            Some(key) if !key.is_empty() => key,
            _ => return Ok(false),
        };
        let name = format!("{}{key}", self.prefix);

        let Some(os_value) = self.lookup(&name) else {
            trace!(var = %name, "not set");
            return Ok(false);
        };
        let raw = os_value
            .into_string()
            .map_err(|_| Error::InvalidUtf8Env { name: name.clone() })?;
        let text = if self.trim_space { raw.trim() } else { raw.as_str() };

        value.set(text).map_err(|source| Error::Env {
            name,
            value: text.to_owned(),
            source,
        })?;
        Ok(true)
    }
}
