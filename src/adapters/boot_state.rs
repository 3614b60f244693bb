//! Reset reason / wakeup cause adapter.
//!
//! - **`target_os = "espidf"`**: reads `esp_reset_reason()` and
//!   `esp_sleep_get_wakeup_cause()` on every call.
//! - **`not(target_os = "espidf")`**: returns the values it was built
//!   with, for host-side testing and simulation.

use crate::app::ports::BootStatePort;
use crate::boot::{ResetReason, WakeupCause};

/// Boot state adapter for the ESP32 platform.
#[derive(Debug, Clone, Copy)]
pub struct EspBootState {
    #[cfg(not(target_os = "espidf"))]
    reset: ResetReason,
    #[cfg(not(target_os = "espidf"))]
    wakeup: WakeupCause,
}

impl Default for EspBootState {
    fn default() -> Self {
        Self::new()
    }
}

impl EspBootState {
    /// On the host this simulates a cold boot.
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            reset: ResetReason::PowerOn,
            #[cfg(not(target_os = "espidf"))]
            wakeup: WakeupCause::Undefined,
        }
    }

    /// Simulated boot with the given causes.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_causes(reset: ResetReason, wakeup: WakeupCause) -> Self {
        Self { reset, wakeup }
    }
}

impl BootStatePort for EspBootState {
    #[cfg(target_os = "espidf")]
    fn reset_reason(&self) -> ResetReason {
        let raw = unsafe { esp_idf_svc::sys::esp_reset_reason() };
        ResetReason::from_raw(raw as u32)
    }

    #[cfg(not(target_os = "espidf"))]
    fn reset_reason(&self) -> ResetReason {
        self.reset
    }

    #[cfg(target_os = "espidf")]
    fn wakeup_cause(&self) -> WakeupCause {
        let raw = unsafe { esp_idf_svc::sys::esp_sleep_get_wakeup_cause() };
        WakeupCause::from_raw(raw as u32)
    }

    #[cfg(not(target_os = "espidf"))]
    fn wakeup_cause(&self) -> WakeupCause {
        self.wakeup
    }
}
