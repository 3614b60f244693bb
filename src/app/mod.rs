//! Application core: boot analysis wiring, zero direct I/O.
//!
//! The rule engine and rule sets never touch registers or flash; they see
//! the chip only through the **port traits** in [`ports`], so the whole
//! startup analysis runs on the host against mocks.

pub mod context;
pub mod ports;
pub mod service;
