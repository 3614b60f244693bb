//! Sleep power-domain configuration rules.
//!
//! Each rule's condition performs the configuration call and reports
//! whether it failed; the action logs the failure.  A pass therefore
//! configures every domain in plan order, and `matched` counts failures.

use log::{debug, error, warn};

use crate::app::ports::PowerDomainPort;
use crate::engine::Rule;
use crate::power::DomainPlan;

/// Build one rule per plan entry.  Domains `port` does not support are
/// left out rather than failing on every boot.
pub fn power_domain_rules<P>(port: &P, plan: &[DomainPlan]) -> Vec<Rule<P>>
where
    P: PowerDomainPort + 'static,
{
    plan.iter()
        .filter(|entry| {
            let supported = port.supports(entry.domain);
            if !supported {
                debug!("power: {} not available on this chip, skipped", entry.domain);
            }
            supported
        })
        .map(|&DomainPlan { domain, option }| {
            Rule::named(
                domain.name(),
                move |port: &P| match port.configure(domain, option) {
                    Ok(()) => false,
                    Err(e) => {
                        warn!("power: {}", e);
                        true
                    }
                },
                move |_: &mut P| {
                    error!("power: failed to configure '{}' power-down domain", domain);
                },
            )
        })
        .collect()
}
