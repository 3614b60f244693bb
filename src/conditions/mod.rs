//! Ready-made rule sets for the boot path.
//!
//! | Module         | Context                  | What the rules do                   |
//! |----------------|--------------------------|-------------------------------------|
//! | `reset`        | any `BootStatePort`      | log reset reason, optional halt     |
//! | `wakeup`       | any `BootStatePort`      | log wakeup cause                    |
//! |                | `BootContext`            | timer-wake cycle counting           |
//! | `counters`     | `BootContext`            | persistent panic/power-on/unknown   |
//! | `power_domain` | any `PowerDomainPort`    | configure sleep domains, log errors |
//!
//! Every builder returns plain [`Rule`](crate::engine::Rule)s, so
//! application code can mix them with its own rules in any order.

pub mod counters;
pub mod power_domain;
pub mod reset;
pub mod wakeup;
