//! Port traits — the boundary between the control core and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Regulator (domain)
//! ```
//!
//! The physical transports (serial register link, two-wire sensor bus,
//! character display, discrete input pins, tick counter) implement these
//! traits. The [`Regulator`](super::service::Regulator) consumes them via
//! generics, so the control core never touches hardware directly and the
//! whole loop runs against mocks on the host.

use crate::error::BusError;

// ───────────────────────────────────────────────────────────────
// Register-protocol link to the frequency converter
// ───────────────────────────────────────────────────────────────

/// Request/response register access to the drive (single fixed slave).
///
/// Each call is one complete transaction on the serial link. Failures
/// are transient by contract; retry policy belongs to the caller.
pub trait RegisterBus {
    /// Read one holding register.
    fn read_register(&mut self, reg: u16) -> Result<u16, BusError>;

    /// Read two consecutive holding registers starting at `start`.
    fn read_register_pair(&mut self, start: u16) -> Result<[u16; 2], BusError>;

    /// Write one holding register.
    fn write_register(&mut self, reg: u16, value: u16) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Two-wire sensor bus
// ───────────────────────────────────────────────────────────────

/// One combined write-then-read transaction with a 7-bit addressed device.
pub trait SensorBus {
    fn transaction(
        &mut self,
        addr: u8,
        command: &[u8],
        response: &mut [u8],
    ) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Operator inputs and display
// ───────────────────────────────────────────────────────────────

/// Raw level read of the three momentary buttons (true = held down).
///
/// Debounce and edge classification happen in
/// [`ButtonPad`](crate::drivers::buttons::ButtonPad), not in the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub increase: bool,
    pub decrease: bool,
    pub mode: bool,
}

/// Discrete input pins.
pub trait Inputs {
    /// Sample the current button levels.
    fn levels(&mut self) -> RawInputs;
}

/// Two-line status display, refreshed every control cycle.
pub trait Display {
    fn show(&mut self, line1: &str, line2: &str);
}

// ───────────────────────────────────────────────────────────────
// Timebase
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond tick plus a blocking delay primitive.
///
/// `now_ms` wraps at `u32::MAX`; compare instants only through
/// [`elapsed_ms`](crate::timebase::elapsed_ms). `sleep_ms` is an
/// explicit sleep-until-deadline, replacing the shared decrementing
/// busy-wait counter of older firmware.
pub trait Clock {
    fn now_ms(&self) -> u32;
    fn sleep_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`RegulatorEvent`](super::events::RegulatorEvent)s
/// through this port. Adapters decide where they go (serial log, trace
/// buffer, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RegulatorEvent);
}
