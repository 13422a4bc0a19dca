//! Differential pressure sensor on the two-wire bus.
//!
//! One best-effort sample per call: write the read command, read a
//! 3-byte response, decode the big-endian signed raw value and scale to
//! pascals. There is no internal retry — the control loop treats each
//! cycle's reading as disposable and skips actuation on failure, so a
//! retry here would only stretch the cycle.

use crate::app::ports::SensorBus;
use crate::error::SensorError;

/// 7-bit device address.
pub const SENSOR_ADDR: u8 = 0x40;
/// Command byte triggering a pressure conversion readout.
pub const READ_PRESSURE_CMD: u8 = 0xF1;

/// Raw counts per pascal.
const SCALE_DIVISOR: f32 = 240.0;
/// Correction factor for the installation altitude.
const ALTITUDE_CORRECTION: f32 = 0.95;

/// Pressure sensor driver. Stateless; the bus is passed per call.
pub struct PressureSensor;

impl PressureSensor {
    pub fn new() -> Self {
        Self
    }

    /// One bus transaction; `Err` is the distinguished fault sentinel,
    /// distinct from a valid zero-pascal reading.
    pub fn read(&self, bus: &mut impl SensorBus) -> Result<u16, SensorError> {
        let mut response = [0u8; 3];
        bus.transaction(SENSOR_ADDR, &[READ_PRESSURE_CMD], &mut response)
            .map_err(SensorError::Bus)?;

        // Bytes 0-1: big-endian signed raw counts. Byte 2 unused.
        let raw = i16::from_be_bytes([response[0], response[1]]);
        Ok(Self::scale(raw))
    }

    /// Counts → pascals, floor-clamped: transient negative readings
    /// (door slam back-pressure) are reported as zero.
    fn scale(raw: i16) -> u16 {
        let pa = f32::from(raw) / SCALE_DIVISOR * ALTITUDE_CORRECTION;
        if pa <= 0.0 { 0 } else { pa as u16 }
    }
}

impl Default for PressureSensor {
    fn default() -> Self {
        Self::new()
    }
}
