//! Full-loop integration tests against recording mock hardware.
//!
//! One `MockHw` object implements every port the regulator consumes and
//! records register writes, display refreshes and emitted events, so
//! the tests can assert on the complete command history without real
//! transports.

use std::collections::VecDeque;

use ventreg::app::events::RegulatorEvent;
use ventreg::app::ports::{
    Clock, Display, EventSink, Inputs, RawInputs, RegisterBus, SensorBus,
};
use ventreg::app::service::Regulator;
use ventreg::config::{RegulatorConfig, StartMode};
use ventreg::control::median::WINDOW_LEN;
use ventreg::drivers::drive::{
    CONTROL_PREPARE, CONTROL_RUN, REG_CONTROL, REG_FREQUENCY, REG_STATUS, STATUS_AT_SETPOINT,
};
use ventreg::error::BusError;
use ventreg::fsm::ModeId;

// ── Mock hardware ─────────────────────────────────────────────

struct MockHw {
    now: u32,
    slept_ms: u32,
    writes: Vec<(u16, u16)>,
    status: u16,
    feedback: Result<[u16; 2], BusError>,
    /// Scripted sensor outcomes (raw counts); `steady` repeats when empty.
    sensor_script: VecDeque<Result<i16, BusError>>,
    steady: Result<i16, BusError>,
    held: RawInputs,
    displays: Vec<(String, String)>,
}

/// Raw counts that decode to exactly `pa` pascals.
fn counts_for(pa: u16) -> i16 {
    (f32::from(pa) / 0.95 * 240.0).ceil() as i16
}

impl MockHw {
    fn new() -> Self {
        Self {
            now: 0,
            slept_ms: 0,
            writes: Vec::new(),
            status: STATUS_AT_SETPOINT,
            feedback: Ok([6000, 15]),
            sensor_script: VecDeque::new(),
            steady: Ok(counts_for(40)),
            held: RawInputs::default(),
            displays: Vec::new(),
        }
    }

    fn queue_pressure(&mut self, pa: u16) {
        self.sensor_script.push_back(Ok(counts_for(pa)));
    }

    fn queue_sensor_fault(&mut self) {
        self.sensor_script.push_back(Err(BusError::Timeout));
    }

    fn frequency_writes(&self) -> Vec<u16> {
        self.writes
            .iter()
            .filter(|(reg, _)| *reg == REG_FREQUENCY)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RegisterBus for MockHw {
    fn read_register(&mut self, reg: u16) -> Result<u16, BusError> {
        assert_eq!(reg, REG_STATUS);
        Ok(self.status)
    }

    fn read_register_pair(&mut self, _start: u16) -> Result<[u16; 2], BusError> {
        self.feedback
    }

    fn write_register(&mut self, reg: u16, value: u16) -> Result<(), BusError> {
        self.writes.push((reg, value));
        Ok(())
    }
}

impl SensorBus for MockHw {
    fn transaction(
        &mut self,
        _addr: u8,
        _command: &[u8],
        response: &mut [u8],
    ) -> Result<(), BusError> {
        let outcome = self.sensor_script.pop_front().unwrap_or(self.steady);
        let raw = outcome?;
        let be = raw.to_be_bytes();
        response[0] = be[0];
        response[1] = be[1];
        response[2] = 0;
        Ok(())
    }
}

impl Inputs for MockHw {
    fn levels(&mut self) -> RawInputs {
        self.held
    }
}

impl Display for MockHw {
    fn show(&mut self, line1: &str, line2: &str) {
        self.displays.push((line1.to_string(), line2.to_string()));
    }
}

impl Clock for MockHw {
    fn now_ms(&self) -> u32 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
        self.slept_ms += ms;
    }
}

// ── Recording event sink ──────────────────────────────────────

struct RecordingSink {
    events: Vec<RegulatorEvent>,
}

impl RecordingSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn mode_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RegulatorEvent::ModeChanged { .. }))
            .count()
    }

    fn sensor_faults(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RegulatorEvent::SensorFault))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &RegulatorEvent) {
        self.events.push(event.clone());
    }
}

// ── Helpers ───────────────────────────────────────────────────

fn config(initial_mode: StartMode) -> RegulatorConfig {
    RegulatorConfig {
        initial_mode,
        ..RegulatorConfig::default()
    }
}

/// Advance one control cycle (100 ms of mock time).
fn run_cycle(reg: &mut Regulator, hw: &mut MockHw, sink: &mut RecordingSink) {
    hw.now = hw.now.wrapping_add(100);
    reg.tick(hw, sink);
}

// ── Startup sequencing ────────────────────────────────────────

#[test]
fn startup_issues_prepare_then_run_then_initial_setpoint() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Automatic));

    reg.start(&mut hw, &mut sink).unwrap();

    // Prepare word, run word, then the initial 30% frequency command.
    assert_eq!(
        hw.writes,
        vec![
            (REG_CONTROL, CONTROL_PREPARE),
            (REG_CONTROL, CONTROL_RUN),
            (REG_FREQUENCY, 6000),
        ]
    );
    // Two settle delays plus one confirming status poll.
    assert_eq!(hw.slept_ms, 1000 + 1000 + 500);
    assert!(matches!(
        sink.events.as_slice(),
        [RegulatorEvent::Started {
            mode: ModeId::Automatic,
            at_setpoint: true
        }]
    ));
}

#[test]
fn startup_exhausts_poll_budget_when_drive_never_confirms() {
    let mut hw = MockHw::new();
    hw.status = 0;
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Automatic));

    reg.start(&mut hw, &mut sink).unwrap();

    // 2 s settling plus 20 polls at 500 ms.
    assert_eq!(hw.slept_ms, 2000 + 10_000);
    assert!(matches!(
        sink.events.as_slice(),
        [RegulatorEvent::Started {
            at_setpoint: false,
            ..
        }]
    ));
}

// ── Manual mode ───────────────────────────────────────────────

#[test]
fn manual_buttons_step_speed_and_command_drive() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Manual));
    reg.start(&mut hw, &mut sink).unwrap();
    hw.writes.clear();

    // Press increase once.
    hw.held = RawInputs {
        increase: true,
        ..RawInputs::default()
    };
    run_cycle(&mut reg, &mut hw, &mut sink);

    // Press decrease, release, press again past the hold-off.
    hw.held = RawInputs {
        decrease: true,
        ..RawInputs::default()
    };
    run_cycle(&mut reg, &mut hw, &mut sink);
    hw.held = RawInputs::default();
    run_cycle(&mut reg, &mut hw, &mut sink);
    hw.held = RawInputs {
        decrease: true,
        ..RawInputs::default()
    };
    run_cycle(&mut reg, &mut hw, &mut sink);

    // 30 +5 -5 -5 = 25%, commanded as 25 * 200 = 5000 units.
    assert_eq!(reg.build_report().speed_percent, 25);
    assert_eq!(hw.frequency_writes().last(), Some(&5000));
}

#[test]
fn manual_commands_drive_every_cycle() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Manual));
    reg.start(&mut hw, &mut sink).unwrap();
    hw.writes.clear();

    for _ in 0..5 {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }
    assert_eq!(hw.frequency_writes(), vec![6000; 5]);
}

#[test]
fn manual_display_shows_speed_and_pressure() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Manual));
    reg.start(&mut hw, &mut sink).unwrap();

    run_cycle(&mut reg, &mut hw, &mut sink);
    let (line1, line2) = hw.displays.last().unwrap();
    assert!(line1.contains("SPEED") && line1.contains("30"));
    assert!(line2.contains("40"));
}

// ── Automatic mode ────────────────────────────────────────────

#[test]
fn automatic_regulates_after_warm_up() {
    let mut hw = MockHw::new();
    hw.steady = Ok(counts_for(20));
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Automatic));
    reg.start(&mut hw, &mut sink).unwrap();
    hw.writes.clear();

    // Warm-up: the median window must fill before any actuation.
    for _ in 0..(WINDOW_LEN - 1) {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }
    assert!(hw.frequency_writes().is_empty());

    run_cycle(&mut reg, &mut hw, &mut sink);
    let commands = hw.frequency_writes();
    assert_eq!(commands.len(), 1);
    // Pressure far below the 60 Pa default setpoint: strong command.
    assert!(commands[0] > 10_000, "weak command {:?}", commands[0]);
}

#[test]
fn sensor_faults_freeze_loop_state_and_flag_display() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Automatic));
    reg.start(&mut hw, &mut sink).unwrap();

    // Let the loop reach steady regulation.
    for _ in 0..(WINDOW_LEN + 2) {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }
    hw.writes.clear();
    let filtered_before = reg.build_report().filtered;

    for _ in 0..3 {
        hw.queue_sensor_fault();
        run_cycle(&mut reg, &mut hw, &mut sink);
        let (_, line2) = hw.displays.last().unwrap();
        assert!(line2.contains("SENSOR FAULT"));
    }

    // No phantom actuation or filter updates across the fault window.
    assert!(hw.frequency_writes().is_empty());
    assert_eq!(reg.build_report().filtered, filtered_before);
    assert_eq!(sink.sensor_faults(), 3);

    // Recovery is immediate once transactions succeed again.
    run_cycle(&mut reg, &mut hw, &mut sink);
    assert_eq!(hw.frequency_writes().len(), 1);
}

#[test]
fn desired_pressure_clamps_at_limits() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Automatic));
    reg.start(&mut hw, &mut sink).unwrap();

    // Hold increase far past the 120 Pa ceiling (cycles 200 ms apart
    // would repeat; 100 ms cycles fire every other one).
    hw.held = RawInputs {
        increase: true,
        ..RawInputs::default()
    };
    for _ in 0..40 {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }
    assert_eq!(reg.build_report().desired, 120);
}

// ── Mode transitions ──────────────────────────────────────────

#[test]
fn held_mode_button_toggles_exactly_once() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Manual));
    reg.start(&mut hw, &mut sink).unwrap();

    hw.held = RawInputs {
        mode: true,
        ..RawInputs::default()
    };
    for _ in 0..10 {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }

    assert_eq!(reg.mode(), ModeId::Automatic);
    assert_eq!(sink.mode_changes(), 1);
}

#[test]
fn release_and_press_again_toggles_back() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Manual));
    reg.start(&mut hw, &mut sink).unwrap();

    hw.held = RawInputs {
        mode: true,
        ..RawInputs::default()
    };
    run_cycle(&mut reg, &mut hw, &mut sink);
    hw.held = RawInputs::default();
    for _ in 0..3 {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }
    hw.held = RawInputs {
        mode: true,
        ..RawInputs::default()
    };
    run_cycle(&mut reg, &mut hw, &mut sink);

    assert_eq!(reg.mode(), ModeId::Manual);
    assert_eq!(sink.mode_changes(), 2);
}

#[test]
fn reentering_automatic_forces_fresh_warm_up() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Automatic));
    reg.start(&mut hw, &mut sink).unwrap();

    for _ in 0..(WINDOW_LEN + 2) {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }
    assert!(reg.build_report().filtered.is_some());

    // Bounce through Manual and back.
    for _ in 0..2 {
        hw.held = RawInputs {
            mode: true,
            ..RawInputs::default()
        };
        run_cycle(&mut reg, &mut hw, &mut sink);
        hw.held = RawInputs::default();
        for _ in 0..2 {
            run_cycle(&mut reg, &mut hw, &mut sink);
        }
    }
    assert_eq!(reg.mode(), ModeId::Automatic);

    // The window was cleared on re-entry: not ready yet.
    assert!(reg.build_report().filtered.is_none());
}

#[test]
fn display_refreshes_every_cycle() {
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    let mut reg = Regulator::new(config(StartMode::Automatic));
    reg.start(&mut hw, &mut sink).unwrap();

    for _ in 0..7 {
        run_cycle(&mut reg, &mut hw, &mut sink);
    }
    assert_eq!(hw.displays.len(), 7);
}
