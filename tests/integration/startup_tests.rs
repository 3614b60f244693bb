//! Integration tests for the StartupService → rule sets → adapters path.
//!
//! Each "boot" builds a fresh `BootContext` around the storage left by the
//! previous one, the way the firmware sees NVS across resets.

use std::cell::Cell;
use std::rc::Rc;

use super::mock_boot::{MockBoot, MockStorage};

use bootcause::adapters::nvs::{CONFIG_KEY, CONFIG_NAMESPACE, NvsAdapter};
use bootcause::adapters::power_domain::EspPowerDomains;
use bootcause::app::context::BootContext;
use bootcause::app::ports::{BootStatePort, ConfigError, ConfigPort, StoragePort};
use bootcause::app::service::{StartupReport, StartupService};
use bootcause::boot::{ResetReason, WakeupCause};
use bootcause::config::AnalyzerConfig;
use bootcause::counters::{COUNTER_NAMESPACE, ResetCounters};
use bootcause::error::Error;
use bootcause::power::{self, PdOption, PowerDomain};

type Service = StartupService<MockBoot, MockStorage, EspPowerDomains>;
type Ctx = BootContext<MockBoot, MockStorage>;

fn service(config: AnalyzerConfig, power: &EspPowerDomains) -> Service {
    StartupService::new(config, power)
}

fn boot_once(
    service: &mut Service,
    power: &mut EspPowerDomains,
    boot: MockBoot,
    storage: MockStorage,
    wake_count: u32,
) -> (StartupReport, Ctx) {
    let mut ctx = BootContext::new(boot, storage, service.config().max_wake_cycles);
    ctx.wake_cycle.count = wake_count;
    let report = service.run(&mut ctx, power);
    (report, ctx)
}

// ── Full startup pass ─────────────────────────────────────────

#[test]
fn cold_boot_runs_all_three_engines() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);

    let (report, ctx) = boot_once(&mut svc, &mut power, MockBoot::cold(), MockStorage::new(), 0);

    assert_eq!(report.snapshot.reset, ResetReason::PowerOn);
    assert_eq!(report.power.total(), power::default_plan().len());
    assert!(report.power_ok());

    let counters = report.counters.expect("counters enabled by default");
    assert_eq!(counters.matched, 1);

    // POWERON_RESET log + UNDEFINED wakeup log + wake-cycle restart.
    assert_eq!(report.boot.matched, 3);

    assert_eq!(ctx.counters.power_on, 1);
    assert_eq!(ctx.wake_cycle.count, 1);
    assert!(ctx.storage.exists(COUNTER_NAMESPACE, "counters"));
}

#[test]
fn power_plan_is_applied_in_order() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);

    let _ = boot_once(&mut svc, &mut power, MockBoot::cold(), MockStorage::new(), 0);

    let expected: Vec<(PowerDomain, PdOption)> = power::default_plan()
        .iter()
        .map(|entry| (entry.domain, entry.option))
        .collect();
    assert_eq!(power.requests(), expected);
}

#[test]
fn report_serialises_to_json() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);

    let (report, _) = boot_once(&mut svc, &mut power, MockBoot::timer_wake(), MockStorage::new(), 0);
    let json = report.to_json().unwrap();

    assert!(json.contains("\"DeepSleep\""), "{json}");
    assert!(json.contains("\"Timer\""), "{json}");
    assert!(json.contains("\"matched\""), "{json}");
}

// ── Reset counters ────────────────────────────────────────────

#[test]
fn counters_persist_across_boots() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);
    let mut storage = MockStorage::new();

    for reset in [
        ResetReason::PowerOn,
        ResetReason::Panic,
        ResetReason::Panic,
        ResetReason::Brownout,
    ] {
        let boot = MockBoot::new(reset, WakeupCause::Undefined);
        let (_, ctx) = boot_once(&mut svc, &mut power, boot, storage, 0);
        storage = ctx.storage;
    }

    let stored = ResetCounters::load(&storage).unwrap();
    assert_eq!(stored.power_on, 1);
    assert_eq!(stored.panic, 2);
    assert_eq!(stored.unknown, 1);
    assert_eq!(stored.total(), 4);
}

#[test]
fn unrecognised_reset_goes_to_the_default_counter() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);
    let boot = MockBoot::new(ResetReason::TaskWatchdog, WakeupCause::Undefined);

    let (report, ctx) = boot_once(&mut svc, &mut power, boot, MockStorage::new(), 0);

    let counters = report.counters.unwrap();
    assert!(counters.none_matched());
    assert_eq!(ctx.counters.unknown, 1);
    assert_eq!(ctx.counters.panic + ctx.counters.power_on, 0);
}

#[test]
fn disabled_counters_touch_no_storage() {
    let mut power = EspPowerDomains::new();
    let config = AnalyzerConfig {
        track_counters: false,
        ..AnalyzerConfig::default()
    };
    let mut svc = service(config, &power);

    let (report, ctx) = boot_once(&mut svc, &mut power, MockBoot::cold(), MockStorage::new(), 0);

    assert!(report.counters.is_none());
    assert_eq!(ctx.storage.writes, 0);
    assert_eq!(ctx.counters, ResetCounters::default());
}

#[test]
fn failed_save_keeps_in_memory_count() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);

    let (report, ctx) = boot_once(&mut svc, &mut power, MockBoot::cold(), MockStorage::failing(), 0);

    assert_eq!(report.counters.unwrap().matched, 1);
    assert_eq!(ctx.counters.power_on, 1);
    assert!(ctx.storage.data.is_empty());
}

#[test]
fn corrupted_counters_restart_from_zero() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);
    let mut storage = MockStorage::new();
    storage.write(COUNTER_NAMESPACE, "counters", &[0xFF; 8]).unwrap();

    let (_, ctx) = boot_once(&mut svc, &mut power, MockBoot::cold(), storage, 0);

    assert_eq!(ctx.counters.power_on, 1);
    assert_eq!(ResetCounters::load(&ctx.storage).unwrap().power_on, 1);
}

// ── Wake cycle ────────────────────────────────────────────────

#[test]
fn wake_cycle_rolls_over_across_timer_wakes() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);
    let mut storage = MockStorage::new();
    let mut count = 0;
    let mut seen = Vec::new();

    let boots = [
        MockBoot::cold(),
        MockBoot::timer_wake(),
        MockBoot::timer_wake(),
        MockBoot::timer_wake(),
    ];
    for boot in boots {
        let (_, ctx) = boot_once(&mut svc, &mut power, boot, storage, count);
        count = ctx.wake_cycle.count;
        seen.push(count);
        storage = ctx.storage;
    }

    assert_eq!(seen, [1, 2, 0, 1]);
}

#[test]
fn software_reset_restarts_the_cycle() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);
    let boot = MockBoot::new(ResetReason::Software, WakeupCause::Undefined);

    let (_, ctx) = boot_once(&mut svc, &mut power, boot, MockStorage::new(), 2);

    assert_eq!(ctx.wake_cycle.count, 1);
}

// ── Power domains ─────────────────────────────────────────────

#[test]
fn failing_domains_are_counted_and_the_rest_still_configured() {
    let mut power = EspPowerDomains::new()
        .fail(PowerDomain::Xtal)
        .fail(PowerDomain::Vddsdio);
    let mut svc = service(AnalyzerConfig::default(), &power);

    let (report, _) = boot_once(&mut svc, &mut power, MockBoot::cold(), MockStorage::new(), 0);

    assert!(!report.power_ok());
    assert_eq!(report.power.matched, 2);
    assert_eq!(power.requests().len(), power::default_plan().len());
}

#[test]
fn unsupported_domains_get_no_rule() {
    let mut power = EspPowerDomains::new().without(PowerDomain::Cpu);
    let mut svc = service(AnalyzerConfig::default(), &power);

    let (report, _) = boot_once(&mut svc, &mut power, MockBoot::cold(), MockStorage::new(), 0);

    assert_eq!(report.power.total(), power::default_plan().len() - 1);
    assert!(power.requests().iter().all(|(domain, _)| *domain != PowerDomain::Cpu));
}

// ── Boot rules ────────────────────────────────────────────────

#[test]
fn boot_default_runs_when_no_rule_covers_the_boot() {
    let mut power = EspPowerDomains::new();
    let mut config = AnalyzerConfig::default();
    config.reset_reasons.clear();
    config.wakeup_causes.clear();
    let mut svc = service(config, &power);
    let boot = MockBoot::new(ResetReason::Brownout, WakeupCause::Undefined);

    let (report, _) = boot_once(&mut svc, &mut power, boot, MockStorage::new(), 0);

    // Only the three wake-cycle rules remain, none of which match.
    assert_eq!(report.boot.total(), 3);
    assert!(report.boot.none_matched());
}

#[test]
fn application_rule_runs_after_the_built_in_ones() {
    let mut power = EspPowerDomains::new();
    let mut svc = service(AnalyzerConfig::default(), &power);
    let hits = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&hits);
    let before = svc.boot_engine_mut().len();

    svc.add_boot_rule(
        |ctx: &Ctx| ctx.reset_reason() == ResetReason::Brownout,
        move |_: &mut Ctx| seen.set(seen.get() + 1),
    );
    let boot = MockBoot::new(ResetReason::Brownout, WakeupCause::Undefined);
    let (report, _) = boot_once(&mut svc, &mut power, boot, MockStorage::new(), 0);

    assert_eq!(svc.boot_engine_mut().len(), before + 1);
    assert_eq!(svc.boot_engine_mut().rule_names().last(), Some(""));
    assert_eq!(report.boot.total(), before + 1);
    assert_eq!(hits.get(), 1);
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn service_built_from_stored_config() {
    let nvs = NvsAdapter::new().unwrap();
    let stored = AnalyzerConfig {
        track_counters: false,
        max_wake_cycles: 7,
        ..AnalyzerConfig::default()
    };
    nvs.save(&stored).unwrap();
    let power = EspPowerDomains::new();

    let svc: Service = StartupService::from_config_port(&nvs, &power).unwrap();

    assert_eq!(svc.config(), &stored);
}

struct BrokenConfig;

impl ConfigPort for BrokenConfig {
    fn load(&self) -> Result<AnalyzerConfig, ConfigError> {
        Err(ConfigError::Corrupted)
    }

    fn save(&self, _: &AnalyzerConfig) -> Result<(), ConfigError> {
        Err(ConfigError::IoError)
    }
}

#[test]
fn unreadable_config_is_reported() {
    let power = EspPowerDomains::new();

    let err = match Service::from_config_port(&BrokenConfig, &power) {
        Ok(_) => panic!("corrupted config must not build a service"),
        Err(e) => e,
    };

    assert_eq!(err, Error::Config(ConfigError::Corrupted));
    assert_eq!(err.to_string(), "config: config corrupted");
}

#[test]
fn startup_runs_on_defaults_when_stored_config_is_garbage() {
    let mut nvs = NvsAdapter::new().unwrap();
    nvs.write(CONFIG_NAMESPACE, CONFIG_KEY, &[0xFF; 4]).unwrap();
    let mut power = EspPowerDomains::new();

    let mut svc: Service = StartupService::from_config_port_or_default(&nvs, &power);
    assert_eq!(svc.config(), &AnalyzerConfig::default());

    let (report, _) = boot_once(&mut svc, &mut power, MockBoot::cold(), MockStorage::new(), 0);

    assert_eq!(report.power.total(), power::default_plan().len());
    assert!(report.counters.is_some());
    assert_eq!(report.boot.matched, 3);
}
