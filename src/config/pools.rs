use std::{fmt, str::FromStr};

use thiserror::Error;

use super::types::PoolRole;

// -----------------------------------------------------------------------------
// ----- BackendAddr -----------------------------------------------------------

/// One `host:port` candidate inside a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAddr {
    pub host: String,
    pub port: u16,
}

impl BackendAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for BackendAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for BackendAddr {
    type Err = AddrError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (host, port) = raw
            .rsplit_once(':')
            .ok_or_else(|| AddrError::MissingPort(raw.to_string()))?;

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(AddrError::EmptyHost(raw.to_string()));
        }

        let port = port
            .parse::<u16>()
            .map_err(|_| AddrError::InvalidPort(raw.to_string()))?;

        Ok(Self::new(host, port))
    }
}

// -----------------------------------------------------------------------------
// ----- Pool ------------------------------------------------------------------

/// Ordered candidate list serving one role. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    role: PoolRole,
    members: Vec<BackendAddr>,
}

impl Pool {
    pub fn new(role: PoolRole, members: Vec<BackendAddr>) -> Self {
        Self { role, members }
    }

    pub fn parse<S: AsRef<str>>(role: PoolRole, raw: &[S]) -> Result<Self, AddrError> {
        let members = raw
            .iter()
            .map(|m| m.as_ref().parse::<BackendAddr>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(role, members))
    }

    pub fn role(&self) -> PoolRole {
        self.role
    }

    pub fn members(&self) -> &[BackendAddr] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{member}")?;
        }
        f.write_str("]")
    }
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddrError {
    #[error("'{0}' is missing a ':port' suffix")]
    MissingPort(String),

    #[error("'{0}' has an empty host")]
    EmptyHost(String),

    #[error("'{0}' has an invalid port")]
    InvalidPort(String),
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
