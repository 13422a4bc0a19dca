//! Frequency-converter drive driver.
//!
//! Commands the fan motor through the drive's holding registers over the
//! serial register link ([`RegisterBus`]). The drive is a dumb actuator:
//! this driver clamps its inputs, bounds every retry, and reports
//! failures to the caller instead of escalating them.
//!
//! ## Register map
//!
//! | Register | Meaning                                   |
//! |----------|-------------------------------------------|
//! | 0        | control word (prepare / run sequencing)   |
//! | 1        | frequency setpoint, 0..=20000 (400/Hz)    |
//! | 3        | status word, bit 0x0100 = at setpoint     |
//! | 102..103 | feedback pair: output frequency, current  |

use log::{debug, warn};

use crate::app::ports::{Clock, RegisterBus};
use crate::config::RegulatorConfig;
use crate::error::BusError;

pub const REG_CONTROL: u16 = 0;
pub const REG_FREQUENCY: u16 = 1;
pub const REG_STATUS: u16 = 3;
pub const REG_FEEDBACK: u16 = 102;

/// Control word priming the drive for a start command.
pub const CONTROL_PREPARE: u16 = 0x0406;
/// Control word putting the drive into run mode.
pub const CONTROL_RUN: u16 = 0x047F;
/// Status-word bit: output frequency has reached the setpoint.
pub const STATUS_AT_SETPOINT: u16 = 0x0100;

/// Frequency register units per speed percent (20000 units = 100%).
pub const UNITS_PER_PERCENT: u16 = 200;
/// Upper bound of the frequency setpoint register.
pub const FREQUENCY_MAX: u16 = 20_000;

/// Scaled feedback pair from registers 102–103.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub frequency: u16,
    pub current: u16,
}

/// Outcome of a bounded feedback read. `attempts` is reported even on
/// success, for transport-health diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackPoll {
    pub feedback: Option<Feedback>,
    pub attempts: u8,
}

/// Driver over the drive's register map. Holds retry budgets only; the
/// bus and clock are passed per call so one hardware object can back
/// every port.
pub struct Drive {
    setpoint_poll_attempts: u8,
    setpoint_poll_interval_ms: u32,
    feedback_read_attempts: u8,
    startup_settle_ms: u32,
}

impl Drive {
    pub fn new(config: &RegulatorConfig) -> Self {
        Self {
            setpoint_poll_attempts: config.setpoint_poll_attempts,
            setpoint_poll_interval_ms: config.setpoint_poll_interval_ms,
            feedback_read_attempts: config.feedback_read_attempts,
            startup_settle_ms: config.startup_settle_ms,
        }
    }

    /// Linear percent → frequency-register mapping (clamped to 100%).
    pub fn percent_to_frequency(percent: u8) -> u16 {
        u16::from(percent.min(100)) * UNITS_PER_PERCENT
    }

    /// Non-blocking speed command: write the frequency register and
    /// return. Does not wait for the drive to reach the setpoint.
    pub fn set_speed(&self, bus: &mut impl RegisterBus, percent: u8) -> Result<(), BusError> {
        bus.write_register(REG_FREQUENCY, Self::percent_to_frequency(percent))
    }

    /// Blocking, verifying frequency command used during startup: write
    /// the setpoint, then poll the status word at a fixed interval until
    /// the at-setpoint bit appears or the poll budget runs out.
    ///
    /// An individual poll failing on the bus counts against the budget
    /// without aborting the wait, mirroring the drive's observed habit
    /// of dropping the odd status read.
    pub fn set_frequency(
        &self,
        hw: &mut (impl RegisterBus + Clock),
        freq: u16,
    ) -> bool {
        let freq = freq.min(FREQUENCY_MAX);
        if let Err(e) = hw.write_register(REG_FREQUENCY, freq) {
            warn!("frequency setpoint write failed: {e}");
        }

        let mut at_setpoint = false;
        let mut polls = 0;
        while polls < self.setpoint_poll_attempts && !at_setpoint {
            hw.sleep_ms(self.setpoint_poll_interval_ms);
            match hw.read_register(REG_STATUS) {
                Ok(status) => {
                    if status & STATUS_AT_SETPOINT != 0 {
                        at_setpoint = true;
                    }
                }
                Err(e) => debug!("status poll failed: {e}"),
            }
            polls += 1;
        }

        debug!(
            "setpoint {} {} after {} ms",
            freq,
            if at_setpoint { "confirmed" } else { "NOT confirmed" },
            u32::from(polls) * self.setpoint_poll_interval_ms
        );
        at_setpoint
    }

    /// Read the feedback register pair, retrying on bus failure up to
    /// the configured budget. Never fatal: exhaustion yields
    /// `feedback: None` and the caller decides how to degrade.
    pub fn read_feedback(&self, bus: &mut impl RegisterBus) -> FeedbackPoll {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match bus.read_register_pair(REG_FEEDBACK) {
                Ok([frequency, current]) => {
                    return FeedbackPoll {
                        feedback: Some(Feedback { frequency, current }),
                        attempts,
                    };
                }
                Err(e) if attempts < self.feedback_read_attempts => {
                    debug!("feedback read attempt {attempts} failed: {e}");
                }
                Err(e) => {
                    warn!("feedback read failed after {attempts} attempts: {e}");
                    return FeedbackPoll {
                        feedback: None,
                        attempts,
                    };
                }
            }
        }
    }

    /// Startup sequencing: prepare word, settle, run word, settle.
    ///
    /// The drive ignores frequency commands until this has been issued,
    /// so it is a hard precondition for the control loop.
    pub fn start(&self, hw: &mut (impl RegisterBus + Clock)) -> Result<(), BusError> {
        hw.write_register(REG_CONTROL, CONTROL_PREPARE)?;
        hw.sleep_ms(self.startup_settle_ms);
        hw.write_register(REG_CONTROL, CONTROL_RUN)?;
        hw.sleep_ms(self.startup_settle_ms);
        Ok(())
    }
}
