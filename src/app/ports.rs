//! Port traits: the hexagonal boundary between the rule engine and the chip.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ conditions / StartupService
//! ```
//!
//! Driven adapters (reset/wakeup registers, sleep power config, NVS)
//! implement these traits.  Rule sets and the
//! [`StartupService`](super::service::StartupService) consume them via
//! generics, so boot analysis runs on the host against mocks.

use crate::boot::{BootSnapshot, ResetReason, WakeupCause};
use crate::config::AnalyzerConfig;
use crate::power::{PdOption, PowerDomain, PowerDomainError};

// ───────────────────────────────────────────────────────────────
// Boot state port (driven adapter: reset/wakeup registers → domain)
// ───────────────────────────────────────────────────────────────

/// Source of the last-boot diagnostic state.
///
/// Implementations read the hardware on every call; the values do not
/// change within one boot, but nothing here relies on that.
pub trait BootStatePort {
    fn reset_reason(&self) -> ResetReason;

    fn wakeup_cause(&self) -> WakeupCause;

    fn snapshot(&self) -> BootSnapshot {
        BootSnapshot {
            reset: self.reset_reason(),
            wakeup: self.wakeup_cause(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Power domain port (driven adapter: domain → sleep power config)
// ───────────────────────────────────────────────────────────────

/// Configures sleep retention of a single power domain.
pub trait PowerDomainPort {
    fn configure(&self, domain: PowerDomain, option: PdOption) -> Result<(), PowerDomainError>;

    /// Whether this chip has the domain at all.
    fn supports(&self, _domain: PowerDomain) -> bool {
        true
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists analyzer configuration.
///
/// Implementations MUST validate before persisting and reject out-of-range
/// values with [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    /// Returns [`AnalyzerConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<AnalyzerConfig, ConfigError>;

    fn save(&self, config: &AnalyzerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Namespaced persistent key-value storage (reset counters, config).
///
/// Write operations MUST be atomic: no partial writes on power loss.
/// The ESP-IDF NVS API guarantees this natively.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    Full,
    IoError,
    /// Stored bytes could not be decoded.
    Corrupted,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored value corrupted"),
        }
    }
}
