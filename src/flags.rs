use crate::{Config, Error, Provider, Tags, Value, ValueId};
use clap::{Arg, ArgAction, Command};
use std::collections::HashMap;
use std::ffi::OsString;
use tracing::debug;

/// Something which knows the command line flag registered for each value.
///
/// This is how [`crate::wrap_err`] finds the flag spelling of a required value.
pub trait FlagRegistry {
    /// Prefix of a flag name on the command line, e.g. `--`
    fn flag_prefix(&self) -> &str;

    /// All registered flags, as (name without prefix, value identity)
    fn visit_all(&self) -> Vec<(&str, ValueId)>;
}

#[derive(Clone, Debug)]
struct FlagDef {
    name: String,
    usage: String,
    id: ValueId,
    is_bool: bool,
    type_name: &'static str,
    default: String,
}

/// A set of command line flags, each bound to a configuration value.
///
/// Flags are parsed with `clap`. Every flag is a long flag which may be given more than once,
/// and each occurrence is passed to the value's `set`, so slices collect all occurrences and
/// scalars keep the last one. Boolean values make flags which take no argument, or an explicit
/// one as in `--debug=false`.
///
/// Parsing produces [`FromFlags`], which is applied like any other provider.
#[derive(Clone, Debug)]
pub struct FlagSet {
    name: String,
    about: Option<String>,
    defs: Vec<FlagDef>,
}

impl FlagSet {
    /// An empty flag set for the program `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            defs: Vec::new(),
        }
    }

    /// Set the description shown at the top of the help text
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Register `--name` for `value`.
    ///
    /// The current value of `value` is shown as the default in the help text. Slices become
    /// completed, so a flag replaces whatever they hold instead of appending to it.
    ///
    /// # Panics
    ///
    /// If `name` is already registered for a different value.
    #[track_caller]
    pub fn add(&mut self, value: &dyn Value, name: &str, usage: &str) {
        let id = value.id();
        if let Some(existing) = self.defs.iter().find(|def| def.name == name) {
            if existing.id == id {
                return;
            }
            panic!("flag redefined: {name}");
        }

        // Marks slices as completed
        let _ = value.get_any();

        debug!(flag = name, type_name = value.type_name(), "flag registered");
        self.defs.push(FlagDef {
            name: name.to_owned(),
            usage: usage.to_owned(),
            id,
            is_bool: value.is_bool_flag(),
            type_name: value.type_name(),
            default: value.to_string(),
        });
    }

    /// Register a flag for every field of `cfg` which has a non-empty `flag` tag.
    ///
    /// The `usage` tag, if any, becomes the help text.
    #[track_caller]
    pub fn add_tagged(&mut self, cfg: &dyn Config) {
        for field in cfg.fields() {
            match field.tags.lookup("flag") {
                Some(flag) if !flag.is_empty() => {
                    self.add(field.value, flag, field.tags.get("usage"));
                }
                _ => {}
            }
        }
    }

    /// The clap command for these flags, e.g. to render help text.
    ///
    /// If a value is registered as `help`, clap's own help flag is left out.
    pub fn command(&self) -> Command {
        let mut command = Command::new(self.name.clone());
        if let Some(about) = self.about.as_ref() {
            command = command.about(about.clone());
        }
        if self.defs.iter().any(|def| def.name == "help") {
            command = command.disable_help_flag(true);
        }
        command.args(self.defs.iter().map(make_arg))
    }

    /// Parse command line arguments, starting with the program name.
    ///
    /// The error is clap's, so `Error::exit` prints help or usage the usual way.
    pub fn parse_from<I, T>(&self, args_os: I) -> Result<FromFlags, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args_os)?;

        let mut occurrences = HashMap::new();
        for def in &self.defs {
            if let Some(args) = matches.get_many::<String>(&def.name) {
                let args: Vec<String> = args.cloned().collect();
                debug!(flag = %def.name, count = args.len(), "flag given");
                occurrences.insert(def.id, (def.name.clone(), args));
            }
        }
        Ok(FromFlags { occurrences })
    }

    /// Parse the arguments of this process
    pub fn parse(&self) -> Result<FromFlags, clap::Error> {
        self.parse_from(std::env::args_os())
    }
}

impl FlagRegistry for FlagSet {
    fn flag_prefix(&self) -> &str {
        "--"
    }

    fn visit_all(&self) -> Vec<(&str, ValueId)> {
        self.defs
            .iter()
            .map(|def| (def.name.as_str(), def.id))
            .collect()
    }
}

fn make_arg(def: &FlagDef) -> Arg {
    let mut help = def.usage.clone();
    if !def.default.is_empty() {
        if !help.is_empty() {
            help.push(' ');
        }
        help += &format!("(default: {})", def.default);
    }

    let arg = Arg::new(def.name.clone())
        .long(def.name.clone())
        .required(false)
        .action(ArgAction::Append)
        .value_name(def.type_name)
        .help(help);

    if def.is_bool {
        arg.num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
    } else {
        arg.num_args(1).allow_hyphen_values(true)
    }
}

/// Values given on the command line, as parsed by [`FlagSet::parse_from`].
///
/// As a [`Provider`] this sets a value from every occurrence of its flag, in order. Values are
/// matched by identity, so it must be applied to the same config the flags were registered from.
#[derive(Clone, Debug, Default)]
pub struct FromFlags {
    occurrences: HashMap<ValueId, (String, Vec<String>)>,
}

impl FromFlags {
    /// True if no flags were given
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

impl Provider for FromFlags {
    fn provide(&self, value: &mut dyn Value, _name: &str, _tags: &Tags) -> Result<bool, Error> {
        let Some((flag, args)) = self.occurrences.get(&value.id()) else {
            return Ok(false);
        };
        for arg in args {
            value.set(arg).map_err(|source| Error::Flag {
                flag: format!("--{flag}"),
                value: arg.clone(),
                source,
            })?;
        }
        Ok(true)
    }
}
