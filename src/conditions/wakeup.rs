//! Wakeup cause rules and the timer-wake cycle.

use log::info;

use crate::app::context::BootContext;
use crate::app::ports::{BootStatePort, StoragePort};
use crate::boot::{ResetReason, WakeupCause};
use crate::engine::Rule;

/// Rule that fires when the last sleep ended because of `cause`.
pub fn on_wakeup<C, A>(cause: WakeupCause, action: A) -> Rule<C>
where
    C: BootStatePort + 'static,
    A: FnMut(&mut C) + 'static,
{
    Rule::named(
        cause.esp_name(),
        move |ctx: &C| ctx.wakeup_cause() == cause,
        action,
    )
}

/// One log rule per listed cause.
pub fn wakeup_rules_for<C>(causes: &[WakeupCause]) -> Vec<Rule<C>>
where
    C: BootStatePort + 'static,
{
    causes
        .iter()
        .map(|&cause| {
            on_wakeup(cause, move |_: &mut C| {
                if cause.light_sleep_only() {
                    info!("wakeup: caused by {} (light sleep only)", cause);
                } else {
                    info!("wakeup: caused by {}", cause);
                }
            })
        })
        .collect()
}

/// One log rule for every reportable wakeup cause.
pub fn wakeup_rules<C>() -> Vec<Rule<C>>
where
    C: BootStatePort + 'static,
{
    let reportable: Vec<WakeupCause> = WakeupCause::ALL
        .into_iter()
        .filter(|cause| *cause != WakeupCause::All)
        .collect();
    wakeup_rules_for(&reportable)
}

/// Timer-wake cycle bookkeeping.
///
/// A power-on or software reset restarts the cycle at 1; each timer wake
/// advances it, and reaching the configured maximum rolls it back to 0.
pub fn wake_cycle_rules<B, S>() -> Vec<Rule<BootContext<B, S>>>
where
    B: BootStatePort + 'static,
    S: StoragePort + 'static,
{
    let restart = |ctx: &mut BootContext<B, S>| {
        ctx.wake_cycle.restart();
        info!("wakeup: cycle restarted, count={}", ctx.wake_cycle.count);
    };

    vec![
        Rule::named(
            "wake-cycle-software-reset",
            |ctx: &BootContext<B, S>| ctx.reset_reason() == ResetReason::Software,
            restart,
        ),
        Rule::named(
            "wake-cycle-power-on",
            |ctx: &BootContext<B, S>| ctx.reset_reason() == ResetReason::PowerOn,
            restart,
        ),
        Rule::named(
            "wake-cycle-timer",
            |ctx: &BootContext<B, S>| ctx.wakeup_cause() == WakeupCause::Timer,
            |ctx: &mut BootContext<B, S>| {
                let count = ctx.wake_cycle.count.saturating_add(1);
                info!("wakeup: timer wake, count={}", count);
                if ctx.wake_cycle.advance() {
                    info!("wakeup: maximum of {} wakes reached, cycle reset", ctx.wake_cycle.max);
                }
            },
        ),
    ]
}
