//! Reset and wakeup cause enumerants.
//!
//! Both sets are closed and mirror the ESP-IDF `esp_reset_reason_t` and
//! `esp_sleep_source_t` codes.  Raw codes the firmware does not know map to
//! `Unknown` / `Undefined` instead of failing.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Why the current boot happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResetReason {
    Unknown = 0,
    PowerOn = 1,
    /// External pin reset (not on every chip).
    External = 2,
    /// `esp_restart()`.
    Software = 3,
    /// Exception or panic.
    Panic = 4,
    InterruptWatchdog = 5,
    TaskWatchdog = 6,
    /// Any other watchdog.
    OtherWatchdog = 7,
    /// Exit from deep sleep.
    DeepSleep = 8,
    Brownout = 9,
    Sdio = 10,
    Usb = 11,
    Jtag = 12,
    Efuse = 13,
    PowerGlitch = 14,
    CpuLockup = 15,
}

impl ResetReason {
    pub const COUNT: usize = 16;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Unknown,
        Self::PowerOn,
        Self::External,
        Self::Software,
        Self::Panic,
        Self::InterruptWatchdog,
        Self::TaskWatchdog,
        Self::OtherWatchdog,
        Self::DeepSleep,
        Self::Brownout,
        Self::Sdio,
        Self::Usb,
        Self::Jtag,
        Self::Efuse,
        Self::PowerGlitch,
        Self::CpuLockup,
    ];

    /// Map a raw `esp_reset_reason_t` value.
    pub fn from_raw(raw: u32) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .unwrap_or(Self::Unknown)
    }

    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// ESP-IDF constant name, used as the rule label.
    pub const fn esp_name(self) -> &'static str {
        match self {
            Self::Unknown => "ESP_RST_UNKNOWN",
            Self::PowerOn => "ESP_RST_POWERON",
            Self::External => "ESP_RST_EXT",
            Self::Software => "ESP_RST_SW",
            Self::Panic => "ESP_RST_PANIC",
            Self::InterruptWatchdog => "ESP_RST_INT_WDT",
            Self::TaskWatchdog => "ESP_RST_TASK_WDT",
            Self::OtherWatchdog => "ESP_RST_WDT",
            Self::DeepSleep => "ESP_RST_DEEPSLEEP",
            Self::Brownout => "ESP_RST_BROWNOUT",
            Self::Sdio => "ESP_RST_SDIO",
            Self::Usb => "ESP_RST_USB",
            Self::Jtag => "ESP_RST_JTAG",
            Self::Efuse => "ESP_RST_EFUSE",
            Self::PowerGlitch => "ESP_RST_PWR_GLITCH",
            Self::CpuLockup => "ESP_RST_CPU_LOCKUP",
        }
    }

    pub const fn is_watchdog(self) -> bool {
        matches!(
            self,
            Self::InterruptWatchdog | Self::TaskWatchdog | Self::OtherWatchdog
        )
    }

    /// Resets that point at a fault rather than a deliberate restart.
    pub const fn is_abnormal(self) -> bool {
        matches!(
            self,
            Self::Panic
                | Self::InterruptWatchdog
                | Self::TaskWatchdog
                | Self::OtherWatchdog
                | Self::Brownout
                | Self::PowerGlitch
                | Self::CpuLockup
        )
    }
}

impl fmt::Display for ResetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unknown => "unknown reset",
            Self::PowerOn => "power-on reset",
            Self::External => "external signal reset",
            Self::Software => "software reset",
            Self::Panic => "panic reset",
            Self::InterruptWatchdog => "interrupt watchdog reset",
            Self::TaskWatchdog => "task watchdog reset",
            Self::OtherWatchdog => "general watchdog reset",
            Self::DeepSleep => "deep sleep wake-up reset",
            Self::Brownout => "brownout reset",
            Self::Sdio => "SDIO reset",
            Self::Usb => "USB reset",
            Self::Jtag => "JTAG reset",
            Self::Efuse => "eFuse reset",
            Self::PowerGlitch => "power glitch reset",
            Self::CpuLockup => "CPU lockup reset",
        };
        f.write_str(text)
    }
}

/// What ended the last sleep.  Only meaningful after a [`ResetReason::DeepSleep`]
/// boot or a light-sleep return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WakeupCause {
    Undefined = 0,
    /// Placeholder source used only to disable all sources; never reported.
    All = 1,
    /// External signal via RTC_IO.
    Ext0 = 2,
    /// External signal via RTC_CNTL.
    Ext1 = 3,
    Timer = 4,
    Touchpad = 5,
    Ulp = 6,
    Gpio = 7,
    Uart = 8,
    Wifi = 9,
    Cocpu = 10,
    CocpuTrap = 11,
    Bluetooth = 12,
}

impl WakeupCause {
    pub const COUNT: usize = 13;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Undefined,
        Self::All,
        Self::Ext0,
        Self::Ext1,
        Self::Timer,
        Self::Touchpad,
        Self::Ulp,
        Self::Gpio,
        Self::Uart,
        Self::Wifi,
        Self::Cocpu,
        Self::CocpuTrap,
        Self::Bluetooth,
    ];

    /// Map a raw `esp_sleep_source_t` value.
    pub fn from_raw(raw: u32) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .unwrap_or(Self::Undefined)
    }

    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub const fn esp_name(self) -> &'static str {
        match self {
            Self::Undefined => "ESP_SLEEP_WAKEUP_UNDEFINED",
            Self::All => "ESP_SLEEP_WAKEUP_ALL",
            Self::Ext0 => "ESP_SLEEP_WAKEUP_EXT0",
            Self::Ext1 => "ESP_SLEEP_WAKEUP_EXT1",
            Self::Timer => "ESP_SLEEP_WAKEUP_TIMER",
            Self::Touchpad => "ESP_SLEEP_WAKEUP_TOUCHPAD",
            Self::Ulp => "ESP_SLEEP_WAKEUP_ULP",
            Self::Gpio => "ESP_SLEEP_WAKEUP_GPIO",
            Self::Uart => "ESP_SLEEP_WAKEUP_UART",
            Self::Wifi => "ESP_SLEEP_WAKEUP_WIFI",
            Self::Cocpu => "ESP_SLEEP_WAKEUP_COCPU",
            Self::CocpuTrap => "ESP_SLEEP_WAKEUP_COCPU_TRAP_TRIG",
            Self::Bluetooth => "ESP_SLEEP_WAKEUP_BT",
        }
    }

    /// Sources that can only end a light sleep.
    pub const fn light_sleep_only(self) -> bool {
        matches!(
            self,
            Self::Gpio | Self::Uart | Self::Wifi | Self::Bluetooth
        )
    }
}

impl fmt::Display for WakeupCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Undefined => "no defined wakeup cause",
            Self::All => "all wakeup sources",
            Self::Ext0 => "external signal via RTC_IO",
            Self::Ext1 => "external signal via RTC_CNTL",
            Self::Timer => "timer",
            Self::Touchpad => "touchpad interrupt",
            Self::Ulp => "ULP program",
            Self::Gpio => "GPIO",
            Self::Uart => "UART",
            Self::Wifi => "WiFi",
            Self::Cocpu => "co-processor interrupt",
            Self::CocpuTrap => "co-processor crash",
            Self::Bluetooth => "Bluetooth",
        };
        f.write_str(text)
    }
}

/// Reset and wakeup cause read together at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootSnapshot {
    pub reset: ResetReason,
    pub wakeup: WakeupCause,
}

impl BootSnapshot {
    pub fn woke_from_sleep(&self) -> bool {
        self.reset == ResetReason::DeepSleep
    }
}

impl Default for BootSnapshot {
    fn default() -> Self {
        Self {
            reset: ResetReason::PowerOn,
            wakeup: WakeupCause::Undefined,
        }
    }
}

// ---------------------------------------------------------------------------
// Coverage
// ---------------------------------------------------------------------------

/// Reset reasons that none of `handled` covers, in code order.
pub fn missing_reset_reasons(
    handled: &[ResetReason],
) -> heapless::Vec<ResetReason, { ResetReason::COUNT }> {
    ResetReason::ALL
        .iter()
        .copied()
        .filter(|reason| !handled.contains(reason))
        .collect()
}

/// Wakeup causes that none of `handled` covers.  [`WakeupCause::All`] is
/// never reported as missing.
pub fn missing_wakeup_causes(
    handled: &[WakeupCause],
) -> heapless::Vec<WakeupCause, { WakeupCause::COUNT }> {
    WakeupCause::ALL
        .iter()
        .copied()
        .filter(|cause| *cause != WakeupCause::All && !handled.contains(cause))
        .collect()
}
