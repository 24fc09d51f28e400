use clap::Parser;
use std::{net::IpAddr, path::PathBuf};

use super::types::LogLevel;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const DEFAULT_CONFIG_FILE: &str = "mogcrab.toml";

// -----------------------------------------------------------------------------
// ----- CliConfig -------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub config_file_location: PathBuf,
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    pub log_level: LogLevel,
}

impl CliConfig {
    /// Parses `std::env::args`. `--help` and `--version` exit 0, usage errors exit 2.
    pub fn from_args() -> Self {
        Self::from_parsed(Args::parse())
    }

    pub fn try_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Args::try_parse_from(iter).map(Self::from_parsed)
    }
}

// -----------------------------------------------------------------------------
// ----- CliConfig: Private ----------------------------------------------------

impl CliConfig {
    fn from_parsed(args: Args) -> Self {
        Self {
            config_file_location: args.config_file,
            host: args.host,
            port: args.port,
            log_level: LogLevel::resolve(args.log_level, args.verbose),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Args ------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mogcrab",
    version,
    about = "Tracker proxy with read-through failover to a secondary pool"
)]
struct Args {
    // TOML file holding pools, listen address and failover settings.
    #[arg(long = "config", short = 'c', env = "MOGCRAB_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    // Overrides `listen_host` from the config file.
    #[arg(long = "host", short = 'H', env = "MOGCRAB_HOST")]
    host: Option<IpAddr>,

    // Overrides `listen_port` from the config file.
    #[arg(long = "port", short = 'p', env = "MOGCRAB_PORT")]
    port: Option<u16>,

    // Log every forwarded request.
    #[arg(long = "verbose", short = 'v')]
    verbose: bool,

    // Explicit level; wins over --verbose.
    #[arg(long = "log")]
    log_level: Option<LogLevel>,
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn defaults_to_error_level_and_default_file() {
        let cli = CliConfig::try_from_iter(["mogcrab"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Error);
        assert_eq!(cli.config_file_location, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(cli.port, None);
    }

    #[test]
    fn verbose_raises_to_debug() {
        let cli = CliConfig::try_from_iter(["mogcrab", "-v"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);

        let cli = CliConfig::try_from_iter(["mogcrab", "--verbose", "--log", "trace"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Trace);
    }

    #[test]
    fn help_is_not_a_usage_error() {
        let err = CliConfig::try_from_iter(["mogcrab", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(err.exit_code(), 0);
    }

    #[test]
    fn unknown_flag_exits_with_two() {
        let err = CliConfig::try_from_iter(["mogcrab", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn listen_overrides() {
        let cli = CliConfig::try_from_iter(["mogcrab", "-H", "127.0.0.1", "-p", "7002"]).unwrap();
        assert_eq!(cli.host, Some("127.0.0.1".parse::<IpAddr>().unwrap()));
        assert_eq!(cli.port, Some(7002));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
