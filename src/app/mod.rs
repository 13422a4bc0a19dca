//! Application layer: port traits, outbound events and the regulator
//! service that orchestrates one control cycle.

pub mod events;
pub mod ports;
pub mod service;
