//! System configuration parameters
//!
//! All tunable parameters for the pressure regulator. PID gains were
//! tuned empirically against the physical plant; they live here, not as
//! literals in the controller, so they can be retuned without touching
//! the control logic.

use serde::{Deserialize, Serialize};

/// Which operating mode the regulator enters at power-up.
///
/// The reference behavior changed between hardware revisions, so this
/// is a startup option rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartMode {
    Manual,
    Automatic,
}

/// Core regulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatorConfig {
    // --- PID gains (per-millisecond time units) ---
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,

    // --- Operator interface ---
    /// Mode entered at power-up
    pub initial_mode: StartMode,
    /// Manual speed adjustment per button event (percentage points)
    pub speed_step: u8,
    /// Desired-pressure adjustment per button event (Pa)
    pub desired_step: u16,
    /// Upper clamp for the desired pressure (Pa)
    pub desired_max: u16,
    /// Manual speed at power-up (0-100%)
    pub initial_speed_percent: u8,
    /// Desired pressure at power-up (Pa)
    pub initial_desired: u16,
    /// Minimum interval between repeated events from a held button (ms)
    pub button_holdoff_ms: u32,

    // --- Drive protocol budgets ---
    /// Status-word polls before giving up on setpoint confirmation
    pub setpoint_poll_attempts: u8,
    /// Interval between status-word polls (ms)
    pub setpoint_poll_interval_ms: u32,
    /// Attempts for the feedback register-pair read
    pub feedback_read_attempts: u8,
    /// Settling delay after each startup control word (ms)
    pub startup_settle_ms: u32,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            // Gains tuned on the reference duct rig
            kp: 0.425,
            ki: 0.013,
            kd: 50.0,

            // Operator interface
            initial_mode: StartMode::Automatic,
            speed_step: 5,
            desired_step: 5,
            desired_max: 120,
            initial_speed_percent: 30,
            initial_desired: 60,
            button_holdoff_ms: 200,

            // Drive protocol
            setpoint_poll_attempts: 20,
            setpoint_poll_interval_ms: 500,
            feedback_read_attempts: 3,
            startup_settle_ms: 1000,
        }
    }
}
