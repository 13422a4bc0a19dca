//! PID controller for the fan speed command.
//!
//! Converts (desired pressure, filtered actual, elapsed ms) into a
//! bounded speed percentage. On top of the classic three terms it adds
//! a setpoint-proportional feed-forward bias (`desired/127 · 100`) so
//! the loop does not have to integrate its way up from zero output.
//!
//! Two guards the field units taught us: the derivative term is zero
//! whenever the elapsed time is zero, and the integral term is frozen
//! while the output saturates (conditional anti-windup).

/// PID regulator with feed-forward bias.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    i_term: f32,
    last_error: f32,
    output_min: f32,
    output_max: f32,
}

/// Divisor of the setpoint-proportional bias term.
const BIAS_SCALE: f32 = 127.0;

impl PidController {
    /// Gains are in per-millisecond time units (see `RegulatorConfig`).
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            i_term: 0.0,
            last_error: 0.0,
            output_min: 0.0,
            output_max: 100.0,
        }
    }

    /// One regulation step. `dt_ms` is the wall-clock interval since the
    /// previous step; the output is a speed percentage in `[0, 100]`.
    pub fn step(&mut self, desired: f32, actual: f32, dt_ms: u32) -> u8 {
        let dt = dt_ms as f32;
        let error = desired - actual;

        // Proportional
        let p = self.kp * error;

        // Integral (increment remembered for the anti-windup back-out)
        let increment = self.ki * error * dt;
        self.i_term += increment;

        // Derivative (zero across a degenerate interval)
        let d = if dt > 0.0 {
            self.kd * (error - self.last_error) / dt
        } else {
            0.0
        };

        // Feed-forward bias proportional to the setpoint
        let bias = desired / BIAS_SCALE * 100.0;

        let output = (p + self.i_term + d + bias).clamp(self.output_min, self.output_max);

        // Anti-windup: saturated output stops integral accumulation.
        if output >= self.output_max || output <= self.output_min {
            self.i_term -= increment;
        }

        self.last_error = error;

        output as u8
    }

    /// Reset accumulated state (on entry to closed-loop operation).
    pub fn reset(&mut self) {
        self.i_term = 0.0;
        self.last_error = 0.0;
    }

    /// Accumulated integral contribution (diagnostics and tests).
    pub fn integral(&self) -> f32 {
        self.i_term
    }

    /// Error seen by the previous step (diagnostics and tests).
    pub fn last_error(&self) -> f32 {
        self.last_error
    }
}
