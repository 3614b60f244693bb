//! Shared context threaded through every boot rule.
//!
//! [`BootContext`] is the `C` of `ConditionEngine<C>` on the startup path.
//! Conditions get `&BootContext` (read the boot registers), actions get
//! `&mut BootContext` (bump counters, persist, advance the wake cycle).
//! Everything a rule can touch is a field here.

use log::info;

use crate::app::ports::{BootStatePort, StoragePort};
use crate::boot::{ResetReason, WakeupCause};
use crate::counters::ResetCounters;

/// Consecutive timer-wake counter.
///
/// Restarted to 1 by a cold or software reset, advanced by every timer
/// wake, and rolled back to 0 when it reaches `max`.  On the device the
/// owner keeps it in RTC memory so it survives deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeCycle {
    pub count: u32,
    pub max: u32,
}

impl WakeCycle {
    pub const fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    pub fn restart(&mut self) {
        self.count = 1;
    }

    /// Count one wake.  Returns `true` when the limit was reached, in which
    /// case the counter is already back at 0.
    pub fn advance(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        if self.count >= self.max {
            self.count = 0;
            true
        } else {
            false
        }
    }
}

/// Explicit state for the boot rule set.
pub struct BootContext<B, S> {
    pub boot: B,
    pub storage: S,
    pub counters: ResetCounters,
    pub wake_cycle: WakeCycle,
}

impl<B, S> BootContext<B, S>
where
    B: BootStatePort,
    S: StoragePort,
{
    pub fn new(boot: B, storage: S, max_wake_cycles: u32) -> Self {
        Self {
            boot,
            storage,
            counters: ResetCounters::default(),
            wake_cycle: WakeCycle::new(max_wake_cycles),
        }
    }

    /// Replace the in-memory counters with the stored ones.
    pub fn load_counters(&mut self) -> Result<(), crate::app::ports::StorageError> {
        self.counters = ResetCounters::load(&self.storage)?;
        Ok(())
    }

    /// Zero all counters, in memory and in storage.
    pub fn reset_counters(&mut self) -> Result<(), crate::app::ports::StorageError> {
        info!("counters: reset requested");
        self.counters.reset(&mut self.storage)
    }
}

impl<B: BootStatePort, S> BootStatePort for BootContext<B, S> {
    fn reset_reason(&self) -> ResetReason {
        self.boot.reset_reason()
    }

    fn wakeup_cause(&self) -> WakeupCause {
        self.boot.wakeup_cause()
    }
}
