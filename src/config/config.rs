use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::fs;

use super::{
    cli::CliConfig,
    pools::{AddrError, Pool},
    types::{ConnectStrategy, PoolRole},
};
use crate::protocol::FailoverPolicy;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const DEFAULT_LISTEN_PORT: u16 = 6002;

const DEFAULT_BACKLOG: u32 = 128;

// -----------------------------------------------------------------------------
// ----- Config ----------------------------------------------------------------

/// Immutable process configuration. Built once, then shared as `Arc<Config>`.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub backlog: u32,
    pub primary: Pool,
    pub secondary: Pool,
    pub backend: BackendSettings,
    pub failover: FailoverPolicy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendSettings {
    pub strategy: ConnectStrategy,
    pub connect_timeout: Option<Duration>,
    pub response_timeout: Option<Duration>,
}

// -----------------------------------------------------------------------------
// ----- Config: Static --------------------------------------------------------

impl Config {
    /// Defaults for everything except the two pools.
    pub fn new(primary: Pool, secondary: Pool) -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_LISTEN_PORT),
            backlog: DEFAULT_BACKLOG,
            primary,
            secondary,
            backend: BackendSettings::default(),
            failover: FailoverPolicy::default(),
        }
    }

    /// Reads the file named on the command line and applies the listen overrides.
    /// The log level stays on `CliConfig`; tracing is up before the file is read.
    pub async fn load(cli: &CliConfig) -> Result<Config, ConfigError> {
        let mut config = Self::from_file_async(&cli.config_file_location).await?;

        if let Some(host) = cli.host {
            config.listen_addr.set_ip(host);
        }
        if let Some(port) = cli.port {
            config.listen_addr.set_port(port);
        }

        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Config, ConfigError> {
        let doc: ConfigFile = toml::from_str(raw).map_err(|e| ConfigError::Toml { source: e })?;

        let primary = Self::parse_pool(PoolRole::Primary, &doc.pools.primary)?;
        let secondary = Self::parse_pool(PoolRole::Secondary, &doc.pools.secondary)?;

        let failover = match doc.failover {
            Some(section) => {
                let reasons = section
                    .reasons
                    .unwrap_or_else(|| FailoverPolicy::default().reasons().to_vec());
                let never_retry = section
                    .never_retry
                    .unwrap_or_else(|| FailoverPolicy::default().never_retry().to_vec());
                validate_tokens("failover.reasons", &reasons)?;
                validate_tokens("failover.never_retry", &never_retry)?;
                FailoverPolicy::new(reasons, never_retry)
            }
            None => FailoverPolicy::default(),
        };

        Ok(Config {
            listen_addr: SocketAddr::new(
                doc.listen_host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
                doc.listen_port.unwrap_or(DEFAULT_LISTEN_PORT),
            ),
            backlog: doc.backlog.unwrap_or(DEFAULT_BACKLOG).max(1),
            primary,
            secondary,
            backend: BackendSettings {
                strategy: doc.connect_strategy.unwrap_or_default(),
                connect_timeout: doc.connect_timeout,
                response_timeout: doc.response_timeout,
            },
            failover,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- Config: Public --------------------------------------------------------

impl Config {
    pub fn pool(&self, role: PoolRole) -> &Pool {
        match role {
            PoolRole::Primary => &self.primary,
            PoolRole::Secondary => &self.secondary,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Config: Private -------------------------------------------------------

impl Config {
    async fn from_file_async(path: &Path) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(path).await.map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&raw)
    }

    fn parse_pool(role: PoolRole, raw: &[String]) -> Result<Pool, ConfigError> {
        let pool =
            Pool::parse(role, raw).map_err(|source| ConfigError::InvalidMember { role, source })?;

        if pool.is_empty() {
            return Err(ConfigError::EmptyPool { role });
        }

        Ok(pool)
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: On-disk format ----------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    listen_host: Option<IpAddr>,

    #[serde(default)]
    listen_port: Option<u16>,

    #[serde(default)]
    backlog: Option<u32>,

    #[serde(default)]
    connect_strategy: Option<ConnectStrategy>,

    #[serde(default, deserialize_with = "de_duration")]
    connect_timeout: Option<Duration>,

    #[serde(default, deserialize_with = "de_duration")]
    response_timeout: Option<Duration>,

    pools: PoolsSection,

    #[serde(default)]
    failover: Option<FailoverSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PoolsSection {
    #[serde(default)]
    primary: Vec<String>,

    #[serde(default)]
    secondary: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FailoverSection {
    #[serde(default)]
    reasons: Option<Vec<String>>,

    #[serde(default)]
    never_retry: Option<Vec<String>>,
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn validate_tokens(field: &'static str, tokens: &[String]) -> Result<(), ConfigError> {
    let bad = tokens
        .iter()
        .any(|t| t.is_empty() || t.chars().any(char::is_whitespace));

    if bad {
        return Err(ConfigError::InvalidField(field));
    }
    Ok(())
}

// humantime strings, e.g. "250ms", "5s", "1m 30s"
fn de_duration<'de, D>(d: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<String> = Option::deserialize(d)?;
    raw.map(|s| humantime::parse_duration(&s).map_err(D::Error::custom))
        .transpose()
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{role} pool has no members")]
    EmptyPool { role: PoolRole },

    #[error("invalid {role} pool member: {source}")]
    InvalidMember { role: PoolRole, source: AddrError },

    #[error("invalid or missing field '{0}'")]
    InvalidField(&'static str),

    #[error("read error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error: {source}")]
    Toml { source: toml::de::Error },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
