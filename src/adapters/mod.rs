//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                     |
//! |----------------|--------------------|---------------------------------|
//! | `boot_state`   | BootStatePort      | `esp_reset_reason`, sleep wakeup|
//! | `nvs`          | ConfigPort         | NVS / in-memory store           |
//! |                | StoragePort        |                                 |
//! | `power_domain` | PowerDomainPort    | `esp_sleep_pd_config`           |

pub mod boot_state;
pub mod nvs;
pub mod power_domain;
