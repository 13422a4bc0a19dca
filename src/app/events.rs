//! Outbound application events.
//!
//! The [`Regulator`](super::service::Regulator) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them — log to the console, record in a
//! test, feed a trace buffer.

use crate::drivers::drive::Feedback;
use crate::error::BusError;
use crate::fsm::ModeId;

/// Structured events emitted by the control core.
#[derive(Debug, Clone)]
pub enum RegulatorEvent {
    /// Startup sequencing completed (carries whether the drive confirmed
    /// the initial setpoint within the poll budget).
    Started { mode: ModeId, at_setpoint: bool },

    /// The operator toggled between Manual and Automatic.
    ModeChanged { from: ModeId, to: ModeId },

    /// The pressure sensor transaction failed this cycle; filter and
    /// controller state were left untouched.
    SensorFault,

    /// A drive register write failed; the actuation cycle was skipped.
    DriveFault(BusError),

    /// Periodic loop snapshot.
    Report(CycleReport),
}

/// A point-in-time snapshot of the control loop, suitable for logging.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    pub mode: ModeId,
    /// Manual speed command (%).
    pub speed_percent: u8,
    /// Automatic-mode pressure setpoint (Pa).
    pub desired: u16,
    /// This cycle's raw sensor reading, if the transaction succeeded.
    pub sample: Option<u16>,
    /// Median-filtered pressure, once the window has filled.
    pub filtered: Option<u16>,
    /// Speed actually commanded this cycle, if any.
    pub commanded: Option<u8>,
    /// Last drive feedback pair (frequency, current), if readable.
    pub feedback: Option<Feedback>,
}
