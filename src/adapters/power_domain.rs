//! Sleep power-domain adapter.
//!
//! - **`target_os = "espidf"`**: `esp_sleep_pd_config()` per domain.  The
//!   8 MHz oscillator is `ESP_PD_DOMAIN_RC_FAST` in ESP-IDF 5.  Domains the
//!   chip lacks (per the `esp32*` cfgs from `esp-idf-sys`) are unsupported.
//! - **`not(target_os = "espidf")`**: records every request and fails the
//!   domains it was told to fail, for host-side tests.

use crate::app::ports::PowerDomainPort;
use crate::power::{PdOption, PowerDomain, PowerDomainError};

#[cfg(not(target_os = "espidf"))]
use std::cell::RefCell;

/// Simulated `ESP_ERR_INVALID_ARG`.
#[cfg(not(target_os = "espidf"))]
pub const SIM_FAILURE_CODE: i32 = 0x102;

pub struct EspPowerDomains {
    #[cfg(not(target_os = "espidf"))]
    requests: RefCell<Vec<(PowerDomain, PdOption)>>,
    #[cfg(not(target_os = "espidf"))]
    failing: Vec<PowerDomain>,
    #[cfg(not(target_os = "espidf"))]
    unsupported: Vec<PowerDomain>,
}

impl Default for EspPowerDomains {
    fn default() -> Self {
        Self::new()
    }
}

impl EspPowerDomains {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            requests: RefCell::new(Vec::new()),
            #[cfg(not(target_os = "espidf"))]
            failing: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            unsupported: Vec::new(),
        }
    }

    /// Make every `configure` of `domain` fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn fail(mut self, domain: PowerDomain) -> Self {
        self.failing.push(domain);
        self
    }

    /// Pretend the chip lacks `domain`.
    #[cfg(not(target_os = "espidf"))]
    pub fn without(mut self, domain: PowerDomain) -> Self {
        self.unsupported.push(domain);
        self
    }

    /// Every request seen so far, in call order.
    #[cfg(not(target_os = "espidf"))]
    pub fn requests(&self) -> Vec<(PowerDomain, PdOption)> {
        self.requests.borrow().clone()
    }

    /// ESP-IDF only declares the domains the target chip can power down.
    #[cfg(target_os = "espidf")]
    fn raw_domain(domain: PowerDomain) -> Option<esp_idf_svc::sys::esp_sleep_pd_domain_t> {
        use esp_idf_svc::sys::*;
        match domain {
            #[cfg(any(esp32, esp32s2, esp32s3, esp32c6, esp32h2))]
            PowerDomain::RtcPeriph => Some(esp_sleep_pd_domain_t_ESP_PD_DOMAIN_RTC_PERIPH),
            #[cfg(any(esp32, esp32s2, esp32s3))]
            PowerDomain::RtcSlowMem => Some(esp_sleep_pd_domain_t_ESP_PD_DOMAIN_RTC_SLOW_MEM),
            #[cfg(any(esp32, esp32s2, esp32s3, esp32c3))]
            PowerDomain::RtcFastMem => Some(esp_sleep_pd_domain_t_ESP_PD_DOMAIN_RTC_FAST_MEM),
            #[cfg(any(esp32s3, esp32c3, esp32c6, esp32h2))]
            PowerDomain::Cpu => Some(esp_sleep_pd_domain_t_ESP_PD_DOMAIN_CPU),
            #[cfg(any(esp32, esp32s2, esp32s3, esp32c3, esp32c6, esp32h2))]
            PowerDomain::Vddsdio => Some(esp_sleep_pd_domain_t_ESP_PD_DOMAIN_VDDSDIO),
            PowerDomain::Xtal => Some(esp_sleep_pd_domain_t_ESP_PD_DOMAIN_XTAL),
            PowerDomain::Rtc8m => Some(esp_sleep_pd_domain_t_ESP_PD_DOMAIN_RC_FAST),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl PowerDomainPort for EspPowerDomains {
    #[cfg(target_os = "espidf")]
    fn configure(&self, domain: PowerDomain, option: PdOption) -> Result<(), PowerDomainError> {
        use esp_idf_svc::sys::*;
        let raw = Self::raw_domain(domain).ok_or(PowerDomainError {
            domain,
            code: ESP_ERR_NOT_SUPPORTED as i32,
        })?;
        let raw_option = match option {
            PdOption::KeepOn => esp_sleep_pd_option_t_ESP_PD_OPTION_ON,
            PdOption::Off => esp_sleep_pd_option_t_ESP_PD_OPTION_OFF,
        };
        let rc = unsafe { esp_sleep_pd_config(raw, raw_option) };
        if rc == ESP_OK {
            Ok(())
        } else {
            Err(PowerDomainError { domain, code: rc })
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure(&self, domain: PowerDomain, option: PdOption) -> Result<(), PowerDomainError> {
        self.requests.borrow_mut().push((domain, option));
        if self.failing.contains(&domain) {
            Err(PowerDomainError {
                domain,
                code: SIM_FAILURE_CODE,
            })
        } else {
            Ok(())
        }
    }

    #[cfg(target_os = "espidf")]
    fn supports(&self, domain: PowerDomain) -> bool {
        Self::raw_domain(domain).is_some()
    }

    #[cfg(not(target_os = "espidf"))]
    fn supports(&self, domain: PowerDomain) -> bool {
        !self.unsupported.contains(&domain)
    }
}
