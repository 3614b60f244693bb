//! Bootcause Firmware: Main Entry Point
//!
//! Runs the boot analysis once, then deep-sleeps on a timer so the next
//! boot is a timer wake.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  EspBootState        NvsAdapter          EspPowerDomains     │
//! │  (BootStatePort)     (Config+Storage)    (PowerDomainPort)   │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          StartupService (pure logic)                   │  │
//! │  │  power · counters · boot   (ConditionEngine ×3)        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use log::{info, warn};

use bootcause::adapters::boot_state::EspBootState;
use bootcause::adapters::nvs::NvsAdapter;
use bootcause::adapters::power_domain::EspPowerDomains;
use bootcause::app::context::BootContext;
use bootcause::app::ports::BootStatePort;
use bootcause::app::service::StartupService;
use bootcause::boot::ResetReason;

/// Time between timer wakes.
const SLEEP_INTERVAL_US: u64 = 10_000_000;

/// Wake cycle count, kept in RTC slow memory across deep sleep.
#[unsafe(link_section = ".rtc.data")]
static WAKE_COUNT: AtomicU32 = AtomicU32::new(0);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("bootcause v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Storage + config ───────────────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NvsAdapter::unpersisted()
        }
    };

    let mut power = EspPowerDomains::new();
    let mut service: StartupService<EspBootState, NvsAdapter, EspPowerDomains> =
        StartupService::from_config_port_or_default(&nvs, &power);

    // Application rule: runs after the built-in ones.
    service.add_boot_rule(
        |ctx| ctx.reset_reason() == ResetReason::Brownout,
        |_| warn!("app: brownout, check the supply before the next wake"),
    );

    // ── 3. Boot analysis ──────────────────────────────────────
    let max_wake_cycles = service.config().max_wake_cycles;
    let mut ctx = BootContext::new(EspBootState::new(), nvs, max_wake_cycles);
    ctx.wake_cycle.count = WAKE_COUNT.load(Ordering::Relaxed);

    let report = service.run(&mut ctx, &mut power);
    WAKE_COUNT.store(ctx.wake_cycle.count, Ordering::Relaxed);

    match report.to_json() {
        Ok(json) => info!("report: {}", json),
        Err(e) => warn!("report: serialisation failed ({})", e),
    }
    info!(
        "counters: panic={} power_on={} unknown={}",
        ctx.counters.panic, ctx.counters.power_on, ctx.counters.unknown
    );

    // ── 4. Sleep ──────────────────────────────────────────────
    info!("sleeping for {} s", SLEEP_INTERVAL_US / 1_000_000);
    // SAFETY: plain ESP-IDF calls from the main task.
    let rc = unsafe { esp_idf_svc::sys::esp_sleep_enable_timer_wakeup(SLEEP_INTERVAL_US) };
    if rc != esp_idf_svc::sys::ESP_OK {
        warn!("timer wakeup setup failed (rc={}), sleeping until reset", rc);
    }
    unsafe { esp_idf_svc::sys::esp_deep_sleep_start() }
}
