//! Startup service. Assembles the boot rule engines from configuration
//! and runs them once per boot.
//!
//! ```text
//!   AnalyzerConfig ──▶ StartupService::new
//!                        ├─ power    : ConditionEngine<P>            (sleep domains)
//!                        ├─ counters : ConditionEngine<BootContext>  (+ unknown default)
//!                        └─ boot     : ConditionEngine<BootContext>  (logs, wake cycle, halt)
//!
//!   run() = configure_power_domains → count_resets → analyze_boot
//! ```
//!
//! Counting runs before the boot rules so a panic is persisted even when
//! `halt_on_panic` stops the boot pass.

use log::{debug, info, warn};
use serde::Serialize;

use crate::app::context::BootContext;
use crate::app::ports::{BootStatePort, ConfigPort, PowerDomainPort, StoragePort};
use crate::boot::{self, BootSnapshot};
use crate::conditions::{counters, power_domain, reset, wakeup};
use crate::config::AnalyzerConfig;
use crate::engine::{ConditionEngine, EvaluationOutcome};
use crate::error::Result;

/// Outcome of one startup analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartupReport {
    pub snapshot: BootSnapshot,
    /// `matched` = domains that failed to configure.
    pub power: EvaluationOutcome,
    /// `None` when counter tracking is disabled.
    pub counters: Option<EvaluationOutcome>,
    pub boot: EvaluationOutcome,
}

impl StartupReport {
    pub fn power_ok(&self) -> bool {
        self.power.none_matched()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub struct StartupService<B, S, P> {
    config: AnalyzerConfig,
    power: ConditionEngine<P>,
    counters: Option<ConditionEngine<BootContext<B, S>>>,
    boot: ConditionEngine<BootContext<B, S>>,
}

impl<B, S, P> StartupService<B, S, P>
where
    B: BootStatePort + 'static,
    S: StoragePort + 'static,
    P: PowerDomainPort + 'static,
{
    /// Build all engines.  `power_port` is only consulted for which
    /// domains the chip supports.
    pub fn new(config: AnalyzerConfig, power_port: &P) -> Self {
        let power_engine = ConditionEngine::new(
            power_domain::power_domain_rules(power_port, &config.power_domains),
            None,
        );

        let counter_engine = config.track_counters.then(|| {
            ConditionEngine::new(counters::counter_rules(), None)
                .with_default(counters::count_unknown())
        });

        let mut boot_engine = ConditionEngine::new(reset::reset_rules_for(&config.reset_reasons), None)
            .with_default(|_: &mut BootContext<B, S>| {
                info!("boot: no known condition detected");
            });
        boot_engine.extend(wakeup::wakeup_rules_for(&config.wakeup_causes));
        boot_engine.extend(wakeup::wake_cycle_rules());
        if config.halt_on_panic {
            boot_engine.push(reset::panic_halt_rule());
        }

        let missing = boot::missing_reset_reasons(&config.reset_reasons);
        if !missing.is_empty() {
            debug!("boot: reset reasons without a rule: {:?}", missing);
        }
        let missing = boot::missing_wakeup_causes(&config.wakeup_causes);
        if !missing.is_empty() {
            debug!("boot: wakeup causes without a rule: {:?}", missing);
        }

        info!(
            "StartupService: {} power rules, {} boot rules, counters {}",
            power_engine.len(),
            boot_engine.len(),
            if counter_engine.is_some() { "on" } else { "off" }
        );

        Self {
            config,
            power: power_engine,
            counters: counter_engine,
            boot: boot_engine,
        }
    }

    /// Load the stored configuration and build the engines from it.
    pub fn from_config_port<Cp: ConfigPort>(config_port: &Cp, power_port: &P) -> Result<Self> {
        let config = config_port.load()?;
        Ok(Self::new(config, power_port))
    }

    /// Like [`from_config_port`](Self::from_config_port), but an unreadable
    /// stored config falls back to the defaults so startup always runs.
    pub fn from_config_port_or_default<Cp: ConfigPort>(config_port: &Cp, power_port: &P) -> Self {
        let config = match config_port.load() {
            Ok(config) => config,
            Err(e) => {
                warn!("config: load failed ({}), using defaults", e);
                AnalyzerConfig::default()
            }
        };
        Self::new(config, power_port)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Apply the sleep power plan.  Failures are logged by the rules and
    /// show up as `matched`.
    pub fn configure_power_domains(&mut self, port: &mut P) -> EvaluationOutcome {
        let outcome = self.power.evaluate(port);
        if outcome.none_matched() {
            info!("power: {} domains configured", outcome.total());
        } else {
            warn!(
                "power: {} of {} domains failed to configure",
                outcome.matched,
                outcome.total()
            );
        }
        outcome
    }

    /// Load the stored counters and run the counting rules.
    pub fn count_resets(&mut self, ctx: &mut BootContext<B, S>) -> Option<EvaluationOutcome> {
        let engine = self.counters.as_mut()?;
        if let Err(e) = ctx.load_counters() {
            warn!("counters: load failed ({}), counting from zero", e);
        }
        Some(engine.evaluate(ctx))
    }

    /// Run the boot rules (reset / wakeup logging, wake cycle, halt).
    pub fn analyze_boot(&mut self, ctx: &mut BootContext<B, S>) -> EvaluationOutcome {
        self.boot.evaluate(ctx)
    }

    /// Full startup analysis in the documented order.
    pub fn run(&mut self, ctx: &mut BootContext<B, S>, power_port: &mut P) -> StartupReport {
        let snapshot = ctx.snapshot();
        info!("boot: {} / wakeup: {}", snapshot.reset, snapshot.wakeup);

        let power = self.configure_power_domains(power_port);
        let counters = self.count_resets(ctx);
        let boot = self.analyze_boot(ctx);

        StartupReport {
            snapshot,
            power,
            counters,
            boot,
        }
    }

    /// Append an application rule to the boot engine.  It runs after the
    /// built-in rules, from the next [`run`](Self::run) on; with
    /// `halt_on_panic` set it is never reached on a panic boot.
    pub fn add_boot_rule<Pr, A>(&mut self, condition: Pr, action: A)
    where
        Pr: FnMut(&BootContext<B, S>) -> bool + 'static,
        A: FnMut(&mut BootContext<B, S>) + 'static,
    {
        self.boot.add_rule(condition, action);
    }

    pub fn boot_engine_mut(&mut self) -> &mut ConditionEngine<BootContext<B, S>> {
        &mut self.boot
    }
}
