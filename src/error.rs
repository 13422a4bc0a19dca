//! Unified error types for the regulator core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the control loop's error handling uniform. All variants are `Copy` so
//! they can be passed through events and the mode machine without
//! allocation. There is no fatal path in this subsystem: every failure
//! is bounded-retried or surfaced and the loop keeps running.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the regulator funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A register-protocol transaction with the drive failed.
    Bus(BusError),
    /// The pressure sensor could not be read.
    Sensor(SensorError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// A single request/response transaction failed on either bus.
///
/// These are transient by contract: callers retry within a bounded
/// budget and then degrade (stale display, skipped actuation cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// No response within the transport's deadline.
    Timeout,
    /// A response arrived but failed framing or checksum validation.
    InvalidResponse,
    /// The addressed device rejected the request.
    Rejected,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "transaction timed out"),
            Self::InvalidResponse => write!(f, "malformed response"),
            Self::Rejected => write!(f, "request rejected"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Distinguished error result of a pressure sample, as opposed to a
/// valid zero reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor bus transaction failed.
    Bus(BusError),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus fault: {e}"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
