//! Unified error type for the boot analyzer's edges.
//!
//! The rule engine itself has no failure modes; everything that can fail
//! (storage, config, sleep power setup) lives in adapters and funnels into
//! this type at the startup path.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};
use crate::power::PowerDomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Persistent storage read/write failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A sleep power domain could not be configured.
    PowerDomain(PowerDomainError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::PowerDomain(e) => write!(f, "power: {e}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PowerDomainError> for Error {
    fn from(e: PowerDomainError) -> Self {
        Self::PowerDomain(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
