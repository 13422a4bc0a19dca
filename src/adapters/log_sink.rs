//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured regulator events to
//! the `log` facade (console on the host, serial in production). A trace
//! buffer or telemetry adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::RegulatorEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RegulatorEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RegulatorEvent) {
        match event {
            RegulatorEvent::Started { mode, at_setpoint } => {
                info!("START | mode={mode:?} | initial_setpoint_confirmed={at_setpoint}");
            }
            RegulatorEvent::ModeChanged { from, to } => {
                info!("MODE  | {from:?} -> {to:?}");
            }
            RegulatorEvent::SensorFault => {
                warn!("FAULT | pressure sensor transaction failed, cycle skipped");
            }
            RegulatorEvent::DriveFault(e) => {
                warn!("FAULT | drive command failed: {e}");
            }
            RegulatorEvent::Report(r) => {
                info!(
                    "LOOP  | mode={:?} | set={} Pa | raw={} | med={} | cmd={} | fb={}",
                    r.mode,
                    r.desired,
                    r.sample.map_or_else(|| "---".into(), |v| v.to_string()),
                    r.filtered.map_or_else(|| "---".into(), |v| v.to_string()),
                    r.commanded
                        .map_or_else(|| "---".into(), |v| format!("{v}%")),
                    r.feedback.map_or_else(
                        || "---".into(),
                        |f| format!("F={} I={}", f.frequency, f.current)
                    ),
                );
            }
        }
    }
}
