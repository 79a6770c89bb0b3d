use confval::{
    provide_struct, wrap_err, Config, Duration, Error, FlagSet, FromEnv, IntBetween,
    ListenPortSlice, NotEmptyStr, Port,
};
use std::process::ExitCode;

/// Settings as they are gathered from the environment and the command line
#[derive(Config)]
struct ExtConfig {
    #[confval(env, flag, usage = "host to connect")]
    host: NotEmptyStr,
    #[confval(env, flag, usage = "port to connect")]
    port: Port,
    #[confval(env, flag, usage = "ports to bind")]
    bind_ports: ListenPortSlice,
    #[confval(flag, usage = "connect timeout")]
    timeout: Duration,
    #[confval(env)]
    retries: IntBetween,
}

impl Default for ExtConfig {
    fn default() -> Self {
        Self {
            host: NotEmptyStr::new(),
            port: Port::must("443"),
            bind_ports: ListenPortSlice::must(&["80", "443"]),
            timeout: Duration::must("30s"),
            // No default, only the allowed range
            retries: IntBetween::between(1, 3),
        }
    }
}

/// Validated settings, in the form the rest of the program wants them
// Only printed here
#[allow(dead_code)]
#[derive(Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    bind_ports: Vec<u16>,
    timeout: std::time::Duration,
    retries: i64,
}

impl ServerConfig {
    fn new(ext: &ExtConfig, flags: &FlagSet) -> Result<Self, Error> {
        let mut err = None;
        let cfg = Self {
            host: ext.host.value(&mut err),
            port: ext.port.value(&mut err),
            bind_ports: ext.bind_ports.value(&mut err),
            timeout: ext.timeout.value(&mut err),
            retries: ext.retries.value(&mut err),
        };
        match err {
            Some(err) => Err(wrap_err(err, Some(flags), &[ext])),
            None => Ok(cfg),
        }
    }
}

fn main() -> ExitCode {
    let mut ext = ExtConfig::default();

    let from_env = FromEnv::new("EXAMPLE_").trim_space();
    if let Err(err) = provide_struct(&mut ext, &[&from_env]) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let mut flags = FlagSet::new("server_config").about("Connects to a host and serves some ports");
    flags.add_tagged(&ext);
    let from_flags = flags.parse().unwrap_or_else(|err| err.exit());
    if let Err(err) = provide_struct(&mut ext, &[&from_flags]) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    match ServerConfig::new(&ext, &flags) {
        Ok(cfg) => {
            println!("{cfg:#?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
