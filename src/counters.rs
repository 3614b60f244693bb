//! Persistent reset counters.
//!
//! Panic, power-on and unrecognised resets are counted across boots and
//! stored as a single postcard blob in the "error_counters" NVS namespace.
//! The counters are plain state handed to rule actions through
//! [`BootContext`](crate::app::context::BootContext); nothing here is global.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StorageError, StoragePort};

pub const COUNTER_NAMESPACE: &str = "error_counters";
const COUNTER_KEY: &str = "counters";

/// Which counter a reset bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Panic,
    PowerOn,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetCounters {
    pub panic: u32,
    pub power_on: u32,
    pub unknown: u32,
}

impl ResetCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the stored counters.  A missing blob yields zeroed counters.
    pub fn load(storage: &dyn StoragePort) -> Result<Self, StorageError> {
        let mut buf = [0u8; 32];
        match storage.read(COUNTER_NAMESPACE, COUNTER_KEY, &mut buf) {
            Ok(len) => {
                let counters: Self =
                    postcard::from_bytes(&buf[..len]).map_err(|_| StorageError::Corrupted)?;
                info!(
                    "counters: loaded (panic={}, power_on={}, unknown={})",
                    counters.panic, counters.power_on, counters.unknown
                );
                Ok(counters)
            }
            Err(StorageError::NotFound) => {
                info!("counters: none stored, starting from zero");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, storage: &mut dyn StoragePort) -> Result<(), StorageError> {
        let bytes = postcard::to_allocvec(self).map_err(|_| StorageError::IoError)?;
        storage.write(COUNTER_NAMESPACE, COUNTER_KEY, &bytes)
    }

    /// Zero every counter and persist the result.
    pub fn reset(&mut self, storage: &mut dyn StoragePort) -> Result<(), StorageError> {
        *self = Self::default();
        self.save(storage)
    }

    /// Increment one counter (saturating) and return its new value.
    pub fn record(&mut self, kind: CounterKind) -> u32 {
        let slot = match kind {
            CounterKind::Panic => &mut self.panic,
            CounterKind::PowerOn => &mut self.power_on,
            CounterKind::Unknown => &mut self.unknown,
        };
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Increment and persist in one step.  A failed save is logged; the
    /// in-memory count is kept either way.
    pub fn record_and_save(&mut self, kind: CounterKind, storage: &mut dyn StoragePort) -> u32 {
        let value = self.record(kind);
        if let Err(e) = self.save(storage) {
            warn!("counters: save failed ({}), {:?} count {} not persisted", e, kind, value);
        }
        value
    }

    pub fn get(&self, kind: CounterKind) -> u32 {
        match kind {
            CounterKind::Panic => self.panic,
            CounterKind::PowerOn => self.power_on,
            CounterKind::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.panic) + u64::from(self.power_on) + u64::from(self.unknown)
    }
}
