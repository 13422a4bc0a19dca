//! Regulator service — the hexagonal core.
//!
//! [`Regulator`] owns the mode machine, the cycle context, and the
//! drivers. All I/O flows through port traits injected at call sites,
//! so the whole loop runs against mock adapters on the host.
//!
//! ```text
//!  SensorBus ───▶ ┌──────────────────────────┐ ───▶ EventSink
//!  Inputs ──────▶ │        Regulator         │ ───▶ Display
//!  RegisterBus ◀─▶│  FSM · Median · PID      │
//!                 └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::RegulatorConfig;
use crate::drivers::buttons::ButtonPad;
use crate::drivers::drive::{Drive, Feedback};
use crate::error::Result;
use crate::fsm::context::CycleContext;
use crate::fsm::states::build_mode_table;
use crate::fsm::{Fsm, ModeId};
use crate::sensors::pressure::PressureSensor;

use super::events::{CycleReport, RegulatorEvent};
use super::ports::{Clock, Display, EventSink, Inputs, RegisterBus, SensorBus};

/// The control core: one instance regulates one physical loop.
pub struct Regulator {
    fsm: Fsm,
    ctx: CycleContext,
    drive: Drive,
    sensor: PressureSensor,
    buttons: ButtonPad,
    /// Last drive feedback pair, refreshed each cycle, never persisted
    /// beyond the next read.
    last_feedback: Option<Feedback>,
}

impl Regulator {
    /// Construct from configuration. Does **not** touch hardware — call
    /// [`start`](Self::start) before the first [`tick`](Self::tick).
    pub fn new(config: RegulatorConfig) -> Self {
        let drive = Drive::new(&config);
        let buttons = ButtonPad::new(config.button_holdoff_ms);
        let initial: ModeId = config.initial_mode.into();
        let ctx = CycleContext::new(config);
        let fsm = Fsm::new(build_mode_table(), initial);

        Self {
            fsm,
            ctx,
            drive,
            sensor: PressureSensor::new(),
            buttons,
            last_feedback: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Startup sequencing: issue the drive's prepare/run control words
    /// with their settling delays, then verify the initial speed with
    /// the blocking setpoint-confirming frequency command, then start
    /// the mode machine.
    ///
    /// A failed control-word write is the one error that propagates: a
    /// drive that never entered run mode will ignore everything the
    /// loop sends it.
    pub fn start(
        &mut self,
        hw: &mut (impl RegisterBus + Clock),
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.drive.start(hw)?;

        let freq = Drive::percent_to_frequency(self.ctx.speed_percent);
        let at_setpoint = self.drive.set_frequency(hw, freq);
        if !at_setpoint {
            warn!("drive did not confirm initial setpoint within poll budget");
        }

        self.fsm.start(&mut self.ctx);
        let mode = self.fsm.current_mode();
        sink.emit(&RegulatorEvent::Started { mode, at_setpoint });
        info!("regulator started in {mode:?}");
        Ok(())
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one control cycle: time → buttons → sensor → mode machine →
    /// actuation → display. Every fault degrades; none terminates.
    pub fn tick(
        &mut self,
        hw: &mut (impl RegisterBus + SensorBus + Inputs + Display + Clock),
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = hw.now_ms();

        let levels = hw.levels();
        self.ctx.inputs = self.buttons.poll(levels, self.ctx.now_ms);

        self.ctx.sample = match self.sensor.read(hw) {
            Ok(pa) => Some(pa),
            Err(e) => {
                warn!("pressure read failed: {e}");
                sink.emit(&RegulatorEvent::SensorFault);
                None
            }
        };

        let prev_mode = self.fsm.current_mode();
        self.ctx.commands.clear();
        self.fsm.tick(&mut self.ctx);

        if let Some(percent) = self.ctx.commands.speed {
            if let Err(e) = self.drive.set_speed(hw, percent) {
                warn!("speed command failed: {e}");
                sink.emit(&RegulatorEvent::DriveFault(e));
            }
        }

        // Feedback pair for diagnostics; stale on failure, never fatal.
        let poll = self.drive.read_feedback(hw);
        self.last_feedback = poll.feedback;

        hw.show(&self.ctx.commands.line1, &self.ctx.commands.line2);

        let mode = self.fsm.current_mode();
        if mode != prev_mode {
            sink.emit(&RegulatorEvent::ModeChanged {
                from: prev_mode,
                to: mode,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current operating mode.
    pub fn mode(&self) -> ModeId {
        self.fsm.current_mode()
    }

    /// Snapshot of the loop for logging or transmission.
    pub fn build_report(&self) -> CycleReport {
        CycleReport {
            mode: self.fsm.current_mode(),
            speed_percent: self.ctx.speed_percent,
            desired: self.ctx.desired,
            sample: self.ctx.sample,
            filtered: self.ctx.filter.value(),
            commanded: self.ctx.commands.speed,
            feedback: self.last_feedback,
        }
    }
}
