//! Bootcause firmware library.
//!
//! An ordered condition → action rule engine plus the boot-time rule sets
//! built on it (reset reasons, wakeup causes, reset counters, sleep power
//! domains).  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so everything here
//! runs on the host against simulated adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod boot;
pub mod conditions;
pub mod config;
pub mod counters;
pub mod engine;
pub mod error;
pub mod power;
pub mod safety;

pub use engine::{ConditionEngine, EvaluationOutcome, Rule};
