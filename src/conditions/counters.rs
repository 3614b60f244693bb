//! Persistent reset counting rules.
//!
//! Panic and power-on resets each bump their own counter.  Anything else
//! falls through to [`count_unknown`], meant to be installed as the
//! engine's default action so it fires only when no counting rule matched.

use log::{info, warn};

use crate::app::context::BootContext;
use crate::app::ports::{BootStatePort, StoragePort};
use crate::boot::ResetReason;
use crate::counters::CounterKind;
use crate::engine::Rule;

pub fn counter_rules<B, S>() -> Vec<Rule<BootContext<B, S>>>
where
    B: BootStatePort + 'static,
    S: StoragePort + 'static,
{
    vec![
        Rule::named(
            "count-panic",
            |ctx: &BootContext<B, S>| ctx.reset_reason() == ResetReason::Panic,
            |ctx: &mut BootContext<B, S>| {
                let n = ctx.counters.record_and_save(CounterKind::Panic, &mut ctx.storage);
                warn!("counters: panic reset detected, count={}", n);
            },
        ),
        Rule::named(
            "count-power-on",
            |ctx: &BootContext<B, S>| ctx.reset_reason() == ResetReason::PowerOn,
            |ctx: &mut BootContext<B, S>| {
                let n = ctx.counters.record_and_save(CounterKind::PowerOn, &mut ctx.storage);
                info!("counters: power-on reset detected, count={}", n);
            },
        ),
    ]
}

/// Default action: count a reset none of [`counter_rules`] recognised.
pub fn count_unknown<B, S>() -> impl FnMut(&mut BootContext<B, S>) + 'static
where
    B: BootStatePort + 'static,
    S: StoragePort + 'static,
{
    |ctx: &mut BootContext<B, S>| {
        let n = ctx.counters.record_and_save(CounterKind::Unknown, &mut ctx.storage);
        warn!(
            "counters: unrecognised reset ({}), unknown count={}",
            ctx.reset_reason(),
            n
        );
    }
}
