//! Simulated plant: fan, duct and sensor physics behind the port traits.
//!
//! One `SimPlant` object implements every hardware port, which is
//! exactly the shape [`Regulator`](crate::app::service::Regulator)
//! expects. The physics are deliberately simple — a slew-limited fan
//! ramp feeding a first-order duct — but they reproduce the behaviors
//! the control core has to cope with: setpoint confirmation lag,
//! occasional sensor glitch spikes, and injectable bus faults.

use log::debug;

use crate::app::ports::{Clock, Display, Inputs, RawInputs, RegisterBus, SensorBus};
use crate::drivers::drive::{
    CONTROL_RUN, FREQUENCY_MAX, REG_CONTROL, REG_FEEDBACK, REG_FREQUENCY, REG_STATUS,
    STATUS_AT_SETPOINT,
};
use crate::error::BusError;
use crate::sensors::pressure::SENSOR_ADDR;

/// Duct pressure at full fan speed (Pa).
const FULL_SCALE_PRESSURE_PA: f32 = 130.0;
/// Fan ramp rate, frequency-register units per millisecond.
const FREQ_SLEW_PER_MS: f32 = 8.0;
/// First-order duct time constant (ms).
const DUCT_TAU_MS: f32 = 1500.0;
/// Frequency error under which the drive reports at-setpoint.
const SETPOINT_BAND: f32 = 100.0;
/// Every Nth sensor read returns a glitch spike.
const SPIKE_INTERVAL_READS: u32 = 37;
/// Glitch amplitude in raw sensor counts.
const SPIKE_COUNTS: f32 = 2500.0;

/// Simulated fan/duct plant implementing all hardware ports.
pub struct SimPlant {
    control_word: u16,
    commanded_freq: u16,
    actual_freq: f32,
    pressure_pa: f32,
    sensor_reads: u32,
    now_ms: u32,
    /// Button levels the next `levels()` call reports.
    pub held: RawInputs,
    /// Force sensor transactions to fail while set.
    pub sensor_fault: bool,
    /// Last rendered display lines.
    pub display: (String, String),
}

impl SimPlant {
    pub fn new() -> Self {
        Self {
            control_word: 0,
            commanded_freq: 0,
            actual_freq: 0.0,
            pressure_pa: 0.0,
            sensor_reads: 0,
            now_ms: 0,
            held: RawInputs::default(),
            sensor_fault: false,
            display: (String::new(), String::new()),
        }
    }

    /// Advance plant physics by `dt_ms` of wall-clock time.
    pub fn advance(&mut self, dt_ms: u32) {
        let dt = dt_ms as f32;

        // Fan: slew-limited ramp toward the commanded frequency, but
        // only once the drive has been sequenced into run mode.
        let target = if self.control_word == CONTROL_RUN {
            f32::from(self.commanded_freq)
        } else {
            0.0
        };
        let max_step = FREQ_SLEW_PER_MS * dt;
        let delta = (target - self.actual_freq).clamp(-max_step, max_step);
        self.actual_freq += delta;

        // Duct: first-order response to the fan.
        let settled = self.actual_freq / f32::from(FREQUENCY_MAX) * FULL_SCALE_PRESSURE_PA;
        let alpha = (dt / DUCT_TAU_MS).min(1.0);
        self.pressure_pa += (settled - self.pressure_pa) * alpha;

        self.now_ms = self.now_ms.wrapping_add(dt_ms);
    }

    /// True duct pressure, for assertions in tests and demos.
    pub fn pressure_pa(&self) -> f32 {
        self.pressure_pa
    }

    fn at_setpoint(&self) -> bool {
        (self.actual_freq - f32::from(self.commanded_freq)).abs() < SETPOINT_BAND
    }
}

impl Default for SimPlant {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimPlant {
    fn read_register(&mut self, reg: u16) -> Result<u16, BusError> {
        match reg {
            REG_STATUS => Ok(if self.at_setpoint() {
                STATUS_AT_SETPOINT
            } else {
                0
            }),
            REG_CONTROL => Ok(self.control_word),
            _ => Err(BusError::Rejected),
        }
    }

    fn read_register_pair(&mut self, start: u16) -> Result<[u16; 2], BusError> {
        if start != REG_FEEDBACK {
            return Err(BusError::Rejected);
        }
        let frequency = self.actual_freq as u16;
        // Motor current rises roughly with output frequency.
        let current = frequency / 400;
        Ok([frequency, current])
    }

    fn write_register(&mut self, reg: u16, value: u16) -> Result<(), BusError> {
        match reg {
            REG_CONTROL => {
                self.control_word = value;
                Ok(())
            }
            REG_FREQUENCY => {
                self.commanded_freq = value.min(FREQUENCY_MAX);
                Ok(())
            }
            _ => Err(BusError::Rejected),
        }
    }
}

impl SensorBus for SimPlant {
    fn transaction(
        &mut self,
        addr: u8,
        _command: &[u8],
        response: &mut [u8],
    ) -> Result<(), BusError> {
        if addr != SENSOR_ADDR {
            return Err(BusError::Rejected);
        }
        if self.sensor_fault {
            return Err(BusError::Timeout);
        }

        self.sensor_reads += 1;
        // Inverse of the driver's counts→pascal transform.
        let mut counts = self.pressure_pa / 0.95 * 240.0;
        if self.sensor_reads % SPIKE_INTERVAL_READS == 0 {
            counts += SPIKE_COUNTS;
        }
        let raw = counts.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
        let be = raw.to_be_bytes();
        response[0] = be[0];
        response[1] = be[1];
        if response.len() > 2 {
            response[2] = 0;
        }
        Ok(())
    }
}

impl Inputs for SimPlant {
    fn levels(&mut self) -> RawInputs {
        self.held
    }
}

impl Display for SimPlant {
    fn show(&mut self, line1: &str, line2: &str) {
        if self.display.0 != line1 || self.display.1 != line2 {
            debug!("display | {line1} | {line2}");
        }
        self.display = (line1.to_string(), line2.to_string());
    }
}

impl Clock for SimPlant {
    fn now_ms(&self) -> u32 {
        self.now_ms
    }

    /// Blocking waits advance the simulation instead of the host clock,
    /// so the drive's setpoint polls see the fan actually ramping.
    fn sleep_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}
