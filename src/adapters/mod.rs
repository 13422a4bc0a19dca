//! Host-side adapters implementing the port traits.

pub mod log_sink;
pub mod sim;
pub mod time;
