//! Host simulation entry point.
//!
//! Runs the regulator against the simulated fan/duct plant: startup
//! sequencing, a stretch of closed-loop regulation, a scripted operator
//! raising the setpoint, a sensor-fault window, and a switch to manual.
//! Useful for eyeballing loop behavior without hardware:
//!
//! ```text
//! RUST_LOG=debug cargo run --bin ventreg-sim
//! ```

use anyhow::Result;
use log::info;

use ventreg::adapters::log_sink::LogEventSink;
use ventreg::adapters::sim::SimPlant;
use ventreg::app::events::RegulatorEvent;
use ventreg::app::ports::{EventSink, RawInputs};
use ventreg::app::service::Regulator;
use ventreg::config::RegulatorConfig;

/// Control cycle period (ms of simulated time per tick).
const CYCLE_MS: u32 = 100;
/// Total simulated cycles.
const CYCLES: u32 = 900;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RegulatorConfig::default();
    let mut plant = SimPlant::new();
    let mut sink = LogEventSink::new();
    let mut regulator = Regulator::new(config);

    info!("ventreg v{} — simulated plant", env!("CARGO_PKG_VERSION"));

    regulator.start(&mut plant, &mut sink)?;

    for cycle in 0..CYCLES {
        plant.advance(CYCLE_MS);
        plant.held = operator_script(cycle);

        // Sensor cable "wiggles loose" for a stretch mid-run.
        plant.sensor_fault = (400..410).contains(&cycle);

        regulator.tick(&mut plant, &mut sink);

        if cycle % 50 == 0 {
            sink.emit(&RegulatorEvent::Report(regulator.build_report()));
        }
    }

    info!(
        "simulation done: final duct pressure {:.1} Pa",
        plant.pressure_pa()
    );
    Ok(())
}

/// Scripted operator: nudge the setpoint up twice, later drop to manual.
fn operator_script(cycle: u32) -> RawInputs {
    match cycle {
        150 | 155 => RawInputs {
            increase: true,
            ..RawInputs::default()
        },
        700 => RawInputs {
            mode: true,
            ..RawInputs::default()
        },
        _ => RawInputs::default(),
    }
}
