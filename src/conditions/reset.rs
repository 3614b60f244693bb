//! Reset reason rules.

use log::{error, info, warn};

use crate::app::ports::BootStatePort;
use crate::boot::ResetReason;
use crate::engine::Rule;
use crate::safety;

/// Rule that fires when the last reset had the given reason.
pub fn on_reset<C, A>(reason: ResetReason, action: A) -> Rule<C>
where
    C: BootStatePort + 'static,
    A: FnMut(&mut C) + 'static,
{
    Rule::named(
        reason.esp_name(),
        move |ctx: &C| ctx.reset_reason() == reason,
        action,
    )
}

/// One log rule per listed reason.  Faulty resets log at warn level.
pub fn reset_rules_for<C>(reasons: &[ResetReason]) -> Vec<Rule<C>>
where
    C: BootStatePort + 'static,
{
    reasons
        .iter()
        .map(|&reason| {
            on_reset(reason, move |_: &mut C| {
                if reason.is_watchdog() {
                    warn!("reset: {} detected, a task stopped feeding its watchdog", reason);
                } else if reason.is_abnormal() {
                    warn!("reset: {} detected", reason);
                } else {
                    info!("reset: {} detected", reason);
                }
            })
        })
        .collect()
}

/// One log rule for every reset reason the chip can report.
pub fn reset_rules<C>() -> Vec<Rule<C>>
where
    C: BootStatePort + 'static,
{
    reset_rules_for(&ResetReason::ALL)
}

/// Stop the firmware after a panic reset.
///
/// The action never returns; place this rule last, since nothing after it
/// is evaluated on a panic boot.
pub fn panic_halt_rule<C>() -> Rule<C>
where
    C: BootStatePort + 'static,
{
    on_reset(ResetReason::Panic, |_: &mut C| {
        error!("reset: panic reset detected, unhandled exception occurred");
        safety::halt("system halting for safety");
    })
}
