//! Control algorithms: median noise rejection and PID regulation.

pub mod median;
pub mod pid;
