//! MeterSwitch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod meter;
pub mod pins;
pub mod safety;
pub mod sensors;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
