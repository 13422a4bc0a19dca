//! Ventreg — duct pressure regulator core.
//!
//! Drives a frequency-converter fan over a serial register protocol to
//! hold an operator-set duct pressure, using an I2C pressure sensor, a
//! sliding-window median filter and a PID controller. All hardware
//! transports (register link, sensor bus, display, discrete inputs,
//! clock) are port traits in [`app::ports`]; the crate ships a host-side
//! simulation adapter instead of board bindings.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod sensors;
pub mod timebase;

pub mod adapters;
