//! Boot analyzer configuration.
//!
//! Decides which ready-made rule sets the startup path installs.  Values can
//! be overridden via NVS through [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::boot::{ResetReason, WakeupCause};
use crate::power::{self, PowerPlan};

pub type ResetReasonList = heapless::Vec<ResetReason, { ResetReason::COUNT }>;
pub type WakeupCauseList = heapless::Vec<WakeupCause, { WakeupCause::COUNT }>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    // --- Reset analysis ---
    /// Reset reasons that get a log rule.  Chips lacking some reasons can
    /// shrink this list; the rest are reported as uncovered at startup.
    pub reset_reasons: ResetReasonList,
    /// Halt the firmware after a panic reset instead of booting normally.
    pub halt_on_panic: bool,
    /// Count panic / power-on / unknown resets in NVS.
    pub track_counters: bool,

    // --- Wakeup analysis ---
    /// Wakeup causes that get a log rule.
    pub wakeup_causes: WakeupCauseList,
    /// Timer wakes before the wake cycle counter rolls over.
    pub max_wake_cycles: u32,

    // --- Sleep power ---
    /// Domains configured before the first deep sleep.
    pub power_domains: PowerPlan,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            reset_reasons: ResetReason::ALL.into_iter().collect(),
            halt_on_panic: false,
            track_counters: true,

            wakeup_causes: WakeupCause::ALL
                .into_iter()
                .filter(|cause| *cause != WakeupCause::All)
                .collect(),
            max_wake_cycles: 3,

            power_domains: power::default_plan(),
        }
    }
}
