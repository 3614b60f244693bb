//! Sleep power-down domains.
//!
//! Before entering deep sleep the firmware decides, per domain, whether the
//! domain stays powered or is cut.  The actual `esp_sleep_pd_config()` call
//! lives behind [`PowerDomainPort`](crate::app::ports::PowerDomainPort).

use core::fmt;
use serde::{Deserialize, Serialize};

/// Independently switchable power domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerDomain {
    RtcPeriph,
    RtcSlowMem,
    RtcFastMem,
    Xtal,
    /// Internal 8 MHz oscillator.
    Rtc8m,
    /// Only on chips with `SOC_PM_SUPPORT_CPU_PD`.
    Cpu,
    Vddsdio,
}

impl PowerDomain {
    pub const ALL: [Self; 7] = [
        Self::RtcPeriph,
        Self::RtcSlowMem,
        Self::RtcFastMem,
        Self::Xtal,
        Self::Rtc8m,
        Self::Cpu,
        Self::Vddsdio,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::RtcPeriph => "RTC_PERIPH",
            Self::RtcSlowMem => "RTC_SLOW_MEM",
            Self::RtcFastMem => "RTC_FAST_MEM",
            Self::Xtal => "XTAL",
            Self::Rtc8m => "RTC8M",
            Self::Cpu => "CPU",
            Self::Vddsdio => "VDDSDIO",
        }
    }
}

impl fmt::Display for PowerDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Retention choice for one domain during sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdOption {
    KeepOn,
    Off,
}

/// One entry of the sleep power plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainPlan {
    pub domain: PowerDomain,
    pub option: PdOption,
}

impl DomainPlan {
    pub const fn new(domain: PowerDomain, option: PdOption) -> Self {
        Self { domain, option }
    }
}

/// Maximum number of entries a plan can hold.
pub const MAX_PLAN_ENTRIES: usize = 8;

pub type PowerPlan = heapless::Vec<DomainPlan, MAX_PLAN_ENTRIES>;

/// Deep-sleep plan: RTC memories retained, everything else cut.
pub fn default_plan() -> PowerPlan {
    [
        DomainPlan::new(PowerDomain::Rtc8m, PdOption::Off),
        DomainPlan::new(PowerDomain::RtcFastMem, PdOption::KeepOn),
        DomainPlan::new(PowerDomain::RtcSlowMem, PdOption::KeepOn),
        DomainPlan::new(PowerDomain::RtcPeriph, PdOption::Off),
        DomainPlan::new(PowerDomain::Xtal, PdOption::Off),
        DomainPlan::new(PowerDomain::Cpu, PdOption::Off),
        DomainPlan::new(PowerDomain::Vddsdio, PdOption::Off),
    ]
    .into_iter()
    .collect()
}

/// `esp_sleep_pd_config()` did not return `ESP_OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerDomainError {
    pub domain: PowerDomain,
    /// Raw `esp_err_t`.
    pub code: i32,
}

impl fmt::Display for PowerDomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "power domain {} config failed (rc={})", self.domain, self.code)
    }
}
