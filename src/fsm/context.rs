//! Shared mutable context threaded through every mode handler.
//!
//! `CycleContext` is the blackboard the mode handlers read from and
//! write to: this cycle's classified inputs and sensor sample on the way
//! in, actuation and display commands on the way out, plus the loop
//! state that persists between cycles (manual speed, pressure setpoint,
//! filter window, controller, last-sample timestamp). Making that state
//! explicit here — instead of module statics — is what gives mode
//! transitions their defined reset semantics.

use heapless::String;

use crate::config::RegulatorConfig;
use crate::control::median::MedianFilter;
use crate::control::pid::PidController;
use crate::drivers::buttons::InputEdges;

/// Width of one display line (2x16 character module).
pub const LINE_LEN: usize = 16;

/// Commands a mode handler writes for the service to apply after the
/// tick. Cleared by the service before every cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleCommands {
    /// Speed percentage to command, or `None` to skip actuation.
    pub speed: Option<u8>,
    /// Display lines for this cycle.
    pub line1: String<LINE_LEN>,
    pub line2: String<LINE_LEN>,
}

impl CycleCommands {
    pub fn clear(&mut self) {
        self.speed = None;
        self.line1.clear();
        self.line2.clear();
    }
}

/// The shared context passed to every mode handler.
pub struct CycleContext {
    // -- This cycle's inputs (written by the service) --
    /// Monotonic timestamp of this cycle (ms, wraps).
    pub now_ms: u32,
    /// Classified button events.
    pub inputs: InputEdges,
    /// This cycle's pressure sample; `None` on a sensor fault.
    pub sample: Option<u16>,

    // -- Persistent loop state --
    /// Manual-mode speed command (0-100%).
    pub speed_percent: u8,
    /// Automatic-mode pressure setpoint (Pa).
    pub desired: u16,
    /// Sliding median window over raw samples.
    pub filter: MedianFilter,
    /// The regulator.
    pub pid: PidController,
    /// Timestamp of the last cycle that obtained a usable sample.
    /// `None` until the first valid sample after entering Automatic, so
    /// the controller's elapsed time never spans a mode switch.
    pub last_sample_ms: Option<u32>,

    // -- Outputs --
    pub commands: CycleCommands,

    // -- Configuration --
    pub config: RegulatorConfig,
}

impl CycleContext {
    pub fn new(config: RegulatorConfig) -> Self {
        Self {
            now_ms: 0,
            inputs: InputEdges::default(),
            sample: None,
            speed_percent: config.initial_speed_percent,
            desired: config.initial_desired,
            filter: MedianFilter::new(),
            pid: PidController::new(config.kp, config.ki, config.kd),
            last_sample_ms: None,
            commands: CycleCommands::default(),
            config,
        }
    }
}
